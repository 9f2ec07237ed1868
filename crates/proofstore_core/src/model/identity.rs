//! Submitter identity capability.

use crate::model::proof::Proof;

/// Anything that can name the user a proof belongs to.
///
/// The store never authenticates; it only filters by the returned string.
pub trait SubmitterIdentity {
    fn submitter_identity(&self) -> &str;
}

impl SubmitterIdentity for str {
    fn submitter_identity(&self) -> &str {
        self
    }
}

impl SubmitterIdentity for String {
    fn submitter_identity(&self) -> &str {
        self.as_str()
    }
}

impl SubmitterIdentity for Proof {
    fn submitter_identity(&self) -> &str {
        self.user_submitted.as_str()
    }
}

impl<T: SubmitterIdentity + ?Sized> SubmitterIdentity for &T {
    fn submitter_identity(&self) -> &str {
        (**self).submitter_identity()
    }
}
