pub mod attributes;
pub mod slide;
pub mod style;

pub use attributes::{
    Background, Border, ElementAttributes, Filters, Font, ObjectFit, Shadow, Shape, Spacing,
    TextAlign,
};
pub use slide::SlideResult;
pub use style::{ComputedStyle, Rect};
