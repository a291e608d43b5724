pub mod launcher;
pub mod wm;
pub mod yabai;

#[cfg(test)]
pub mod fake;
