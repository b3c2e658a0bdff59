mod blocks;
mod commands;
mod layers;
mod types;

pub use blocks::{find_executable_blocks, find_skip_anchor};
pub use commands::{decode_lossy, is_comment, is_homing, is_vertical_move, split_lines, vertical_move_z};
pub use layers::{find_layer_markers, find_vertical_moves};
pub use types::{ExecutableBlock, LayerMarker, VerticalMove};
