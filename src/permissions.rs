use std::str::FromStr;

use crate::WorkflowError;

bitflags! {
    /// Permissions allow for a fine-grained control over what actions a given
    /// user can take.
    pub struct PermissionBits: i32 {
        /// Permission holder can control documents: start and cancel review
        /// rounds, close review steps, and build transmittals.
        const CONTROL_DOCUMENT = 0x00000001;
        /// Permission holder can take part in reviews they are assigned to.
        const REVIEW = 0x00000002;
        /// Permission holder can acknowledge receipt of transmittals sent to
        /// their organisation.
        const ACK_TRANSMITTAL = 0x00000004;
        /// Permission holder can create and edit distribution lists.
        const MANAGE_DISTRIBUTION_LISTS = 0x00000008;
    }
}

impl PermissionBits {
    /// Verify that all required permissions are present.
    ///
    /// This is the same check as `self.contains(permissions)`, but returns
    /// a [`WorkflowError`].
    pub fn require(&self, permissions: PermissionBits)
    -> Result<(), RequirePermissionsError> {
        if self.contains(permissions) {
            Ok(())
        } else {
            Err(RequirePermissionsError(permissions - *self))
        }
    }
}

impl FromStr for PermissionBits {
    type Err = ParsePermissionsError;

    /// Parse a comma separated list of permission names.
    fn from_str(v: &str) -> Result<PermissionBits, ParsePermissionsError> {
        v.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| match name {
                "control-document" => Ok(PermissionBits::CONTROL_DOCUMENT),
                "review" => Ok(PermissionBits::REVIEW),
                "ack-transmittal" => Ok(PermissionBits::ACK_TRANSMITTAL),
                "manage-distribution-lists" =>
                    Ok(PermissionBits::MANAGE_DISTRIBUTION_LISTS),
                _ => Err(ParsePermissionsError(name.to_string())),
            })
            .try_fold(PermissionBits::empty(), |bits, bit| Ok(bits | bit?))
    }
}

#[derive(WorkflowError, Debug, Fail)]
#[workflow(code = "user:insufficient-permissions")]
#[fail(display = "Missing required permissions: {:?}", _0)]
pub struct RequirePermissionsError(PermissionBits);

#[derive(Debug, Fail)]
#[fail(display = "Unknown permission: {}", _0)]
pub struct ParsePermissionsError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_names() {
        let bits: PermissionBits = "control-document, review".parse().unwrap();
        assert_eq!(
            bits,
            PermissionBits::CONTROL_DOCUMENT | PermissionBits::REVIEW,
        );
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("control-document,frobnicate"
            .parse::<PermissionBits>()
            .is_err());
    }

    #[test]
    fn require_reports_missing_bits() {
        let bits = PermissionBits::REVIEW;
        assert!(bits.require(PermissionBits::REVIEW).is_ok());
        assert!(bits.require(PermissionBits::CONTROL_DOCUMENT).is_err());
    }
}
