//! Client side of the contact pipeline: form state, local checks and the
//! transport that talks to `/submit-contact`.

pub mod form;
pub mod transport;

pub use form::{ContactForm, FormError, FormStatus, SubmissionOutcome};
pub use transport::{ClientError, ContactReply, ContactTransport, HttpContactTransport};
