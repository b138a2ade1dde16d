use std::convert::TryFrom;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use minifb::{Key, Window, WindowOptions};
use plotters::prelude::*;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::scene::Animator;

pub const WINDOW_TITLE: &str = "trajviz";

/// Calls a per-frame function once for every frame index, in order, with
/// `interval` between frames when played back in real time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Animation {
    pub frames: usize,
    pub interval: Duration,
}

impl Animation {
    pub fn new(frames: usize, interval: Duration) -> Self {
        Animation { frames, interval }
    }

    pub fn run<F>(&self, mut func: F) -> Result<()>
    where
        F: FnMut(usize) -> Result<()>,
    {
        for num in 0..self.frames {
            func(num)?;
        }
        Ok(())
    }

    /// Frame shown at `tick` when the animation repeats, or `None` without frames.
    pub fn frame_at(&self, tick: usize) -> Option<usize> {
        if self.frames == 0 {
            return None;
        }
        Some(tick % self.frames)
    }

    /// Time after `start` at which `tick` is due.
    pub fn offset(&self, tick: usize) -> Duration {
        let tick = u32::try_from(tick).unwrap_or(u32::MAX);
        self.interval.checked_mul(tick).unwrap_or(Duration::MAX)
    }

    /// How long to wait at `now` before showing `tick`.
    pub fn wait(&self, start: Instant, tick: usize, now: Instant) -> Duration {
        self.offset(tick)
            .saturating_sub(now.saturating_duration_since(start))
    }
}

/// Writes every frame of the animation to a GIF. Blocks until the last
/// frame has been encoded.
pub fn save_gif<P: AsRef<Path>>(
    animator: &mut Animator,
    path: P,
    fps: u32,
    size: (u32, u32),
) -> Result<()> {
    let path = path.as_ref();
    let delay = 1000 / fps.max(1);
    let root = BitMapBackend::gif(path, size, delay)
        .map_err(|e| Error::Plot(e.to_string()))?
        .into_drawing_area();

    let frames = animator.num_frames();
    if frames == 0 {
        animator.draw(&root)?;
        root.present()?;
        return Ok(());
    }

    Animation::new(frames, Duration::from_millis(u64::from(delay))).run(|num| {
        animator.update(num);
        animator.draw(&root)?;
        root.present()?;
        debug!(frame = num, "encoded frame");
        Ok(())
    })?;

    info!(path = %path.display(), frames, "saved animation");
    Ok(())
}

/// Renders the current state of `animator` into a packed RGB buffer.
pub fn render_rgb(animator: &Animator, buf: &mut [u8], size: (u32, u32)) -> Result<()> {
    let root = BitMapBackend::with_buffer(buf, size).into_drawing_area();
    animator.draw(&root)?;
    root.present()?;
    Ok(())
}

// Packs an RGB buffer into the 0RGB words minifb expects.
fn to_minifb_buffer(rgb: &[u8], out: &mut [u32]) {
    rgb.chunks_exact(3).zip(out.iter_mut()).for_each(|(p, o)| {
        *o = (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2]);
    });
}

/// Opens a window and loops the animation, one frame per `interval`, until
/// it is closed or Escape is pressed.
pub fn show(animator: &mut Animator, interval: Duration, size: (u32, u32)) -> Result<()> {
    let (w, h) = (size.0 as usize, size.1 as usize);
    let mut window = Window::new(WINDOW_TITLE, w, h, WindowOptions::default())?;
    // paced below
    window.set_target_fps(0);

    let mut rgb = vec![0u8; w * h * 3];
    let mut pixels = vec![0u32; w * h];
    let animation = Animation::new(animator.num_frames(), interval);

    if animation.frames == 0 {
        render_rgb(animator, &mut rgb, size)?;
        to_minifb_buffer(&rgb, &mut pixels);
    }

    let start = Instant::now();
    let mut tick = 0;
    while window.is_open() && !window.is_key_down(Key::Escape) {
        if let Some(num) = animation.frame_at(tick) {
            animator.update(num);
            render_rgb(animator, &mut rgb, size)?;
            to_minifb_buffer(&rgb, &mut pixels);
        }
        window.update_with_buffer(&pixels, w, h)?;

        tick += 1;
        thread::sleep(animation.wait(start, tick, Instant::now()));
    }

    debug!(ticks = tick, "window closed");
    Ok(())
}
