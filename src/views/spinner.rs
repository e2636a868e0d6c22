use std::time::Instant;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_MS: u128 = 80;

pub fn spinner_frame(start: Instant) -> &'static str {
    let index = (start.elapsed().as_millis() / FRAME_MS) as usize % FRAMES.len();
    FRAMES[index]
}
