mod command_palette;
mod key_result;

pub use command_palette::CommandPalette;
pub use key_result::KeyResult;
