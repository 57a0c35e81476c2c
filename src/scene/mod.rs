pub mod course;
pub mod prefabs;
