mod basis;
mod bound_box;
mod ray;
mod value_range;
mod viewport_box;

pub use basis::create_cs;
pub use bound_box::{BoundBox, BoundBoxIterator};
pub use ray::Ray;
pub use value_range::ValueRange;
pub use viewport_box::ViewportBox;
