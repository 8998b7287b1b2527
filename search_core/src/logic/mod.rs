pub mod isolation;
pub mod maze;
pub mod maze_world;
