//! Data and behaviours modelled as objects.

pub mod category;
pub mod distribution_list;
pub mod document;
pub mod entity;
pub mod event;
pub mod export;
pub mod review;
pub mod revision;
pub mod transmittal;
pub mod user;

pub use self::{
    category::Category,
    distribution_list::{DistributionList, Membership},
    document::Document,
    entity::Entity,
    event::Event,
    export::Export,
    review::Review,
    revision::{ReviewStep, Revision, RoundState},
    transmittal::OutgoingTransmittal,
    user::User,
};
