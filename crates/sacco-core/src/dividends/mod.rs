pub mod weighted;
