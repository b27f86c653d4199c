//! rowblur applies a 3x3 box blur to an RGBA8 raster, splitting the rows into contiguous
//! bands and running one worker per band.
//!
//! # Pass overview
//!
//! 1. **Plan**: `height + workers -> Vec<RowBand>` (remainder rows go to the last band)
//! 2. **Run**: every worker reads the whole input and writes only its band of the output,
//!    staging the band in a private scratch buffer first
//! 3. **Join**: the output [`Image`] is handed back only after every worker finished
//!
//! Edge pixels average only their in-bounds neighbours (no padding, no mirroring) and every
//! channel uses truncating integer division, so the output does not depend on the worker
//! count or the [`Scheduler`].
//!
//! Decoding and encoding live in [`decode_image`] / [`encode_png`] and are not used by the
//! engine itself.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod blur;
mod foundation;

pub use assets::decode::{decode_image, encode_png, load_image, save_png};
pub use blur::coordinator::{
    BlurOpts, BlurPass, DEFAULT_WORKERS, PassReport, Scheduler, blur, blur_with_opts,
};
pub use blur::kernel::{RADIUS, box3_pixel, run_band};
pub use blur::plan::{check_worker_count, plan_bands};
pub use foundation::buffer::{CHANNELS, alloc_zeroed, rgba_len};
pub use foundation::core::{Image, RowBand};
pub use foundation::error::{BlurError, BlurResult};
