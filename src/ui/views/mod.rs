mod gallery;
mod health;
mod model_detail;

pub use gallery::GalleryView;
pub use health::HealthView;
pub use model_detail::ModelDetailView;
