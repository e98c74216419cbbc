mod area;
mod volume;

pub use area::SurfaceArea;
pub use volume::Volume;
