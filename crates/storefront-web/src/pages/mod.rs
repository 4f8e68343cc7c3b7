//! Page Components

mod landing;
mod success;

pub use landing::LandingPage;
pub use success::SuccessPage;
