table! {
    categories (id) {
        id -> Int4,
        name -> Varchar,
        originator -> Varchar,
        kind -> crate::db::types::Category_kind,
    }
}

table! {
    category_contracts (category, contract_number) {
        category -> Int4,
        contract_number -> Varchar,
    }
}

table! {
    category_third_parties (category, entity) {
        category -> Int4,
        entity -> Int4,
    }
}

table! {
    distribution_list_categories (list, category) {
        list -> Int4,
        category -> Int4,
    }
}

table! {
    distribution_list_reviewers (list, user) {
        list -> Int4,
        user -> Int4,
    }
}

table! {
    distribution_lists (id) {
        id -> Int4,
        name -> Varchar,
        leader -> Int4,
        approver -> Nullable<Int4>,
    }
}

table! {
    documents (id) {
        id -> Int4,
        category -> Int4,
        document_key -> Varchar,
        title -> Varchar,
        current_revision -> Int4,
    }
}

table! {
    entities (id) {
        id -> Int4,
        trigram -> Varchar,
        name -> Varchar,
    }
}

table! {
    events (id) {
        id -> Int4,
        user -> Int4,
        timestamp -> Timestamp,
        kind -> Varchar,
        is_unread -> Bool,
        data -> Bytea,
    }
}

table! {
    exported_revisions (id) {
        id -> Int4,
        transmittal -> Int4,
        document -> Int4,
        revision -> Int4,
        title -> Varchar,
        status -> Varchar,
        return_code -> Nullable<Varchar>,
    }
}

table! {
    exports (id) {
        id -> Uuid,
        owner -> Int4,
        category -> Int4,
        format -> crate::db::types::Export_format,
        status -> crate::db::types::Export_status,
        created_on -> Timestamp,
    }
}

table! {
    outgoing_transmittals (id) {
        id -> Int4,
        document -> Int4,
        revisions_category -> Int4,
        contract_number -> Varchar,
        originator -> Varchar,
        recipient -> Int4,
        sequential_number -> Int4,
        created_on -> Timestamp,
        ack_of_receipt_date -> Nullable<Timestamp>,
        ack_of_receipt_author -> Nullable<Int4>,
    }
}

table! {
    reviews (id) {
        id -> Int4,
        document -> Int4,
        revision -> Int4,
        reviewer -> Int4,
        role -> crate::db::types::Review_role,
        status -> crate::db::types::Review_status,
        docclass -> Int4,
        start_date -> Date,
        due_date -> Date,
        closed_on -> Nullable<Timestamp>,
        amended_on -> Nullable<Timestamp>,
        comments -> Nullable<Varchar>,
        return_code -> Nullable<Varchar>,
    }
}

table! {
    revision_reviewers (revision, user) {
        revision -> Int4,
        user -> Int4,
    }
}

table! {
    revisions (id) {
        id -> Int4,
        document -> Int4,
        revision -> Int4,
        status -> Varchar,
        docclass -> Int4,
        return_code -> Nullable<Varchar>,
        received_date -> Date,
        leader -> Nullable<Int4>,
        approver -> Nullable<Int4>,
        review_start_date -> Nullable<Date>,
        review_due_date -> Nullable<Date>,
        reviewers_step_closed -> Nullable<Date>,
        leader_step_closed -> Nullable<Date>,
        review_end_date -> Nullable<Date>,
    }
}

table! {
    users (id) {
        id -> Int4,
        email -> Varchar,
        name -> Varchar,
        is_external -> Bool,
        entity -> Nullable<Int4>,
        permissions -> Int4,
    }
}

joinable!(category_contracts -> categories (category));
joinable!(category_third_parties -> categories (category));
joinable!(category_third_parties -> entities (entity));
joinable!(distribution_list_categories -> categories (category));
joinable!(distribution_list_categories -> distribution_lists (list));
joinable!(distribution_list_reviewers -> distribution_lists (list));
joinable!(distribution_list_reviewers -> users (user));
joinable!(documents -> categories (category));
joinable!(events -> users (user));
joinable!(exported_revisions -> documents (document));
joinable!(exported_revisions -> outgoing_transmittals (transmittal));
joinable!(exports -> categories (category));
joinable!(exports -> users (owner));
joinable!(outgoing_transmittals -> categories (revisions_category));
joinable!(outgoing_transmittals -> documents (document));
joinable!(outgoing_transmittals -> entities (recipient));
joinable!(reviews -> documents (document));
joinable!(reviews -> users (reviewer));
joinable!(revision_reviewers -> revisions (revision));
joinable!(revision_reviewers -> users (user));
joinable!(revisions -> documents (document));
joinable!(users -> entities (entity));

allow_tables_to_appear_in_same_query!(
    categories,
    category_contracts,
    category_third_parties,
    distribution_list_categories,
    distribution_list_reviewers,
    distribution_lists,
    documents,
    entities,
    events,
    exported_revisions,
    exports,
    outgoing_transmittals,
    reviews,
    revision_reviewers,
    revisions,
    users,
);
