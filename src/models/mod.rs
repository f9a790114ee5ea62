pub mod product;
pub mod profile;
pub mod recommendation;
pub mod submission;
pub mod upload;

pub use product::{PriceValue, ProductRecord, ProductType};
pub use profile::{Finish, SkinType, UserProfile};
pub use recommendation::{Recommendation, SubmissionReport};
pub use submission::{Stage, Submission};
pub use upload::{IngestedImage, UploadTicket};
