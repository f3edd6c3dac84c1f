pub mod completion;
pub mod hdiff;
pub mod mindmap;
