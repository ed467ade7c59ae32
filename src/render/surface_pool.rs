use std::collections::HashMap;

use crate::foundation::error::{DrapeError, DrapeResult};

/// Retention limits for pooled layer pixmaps.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SurfacePoolOpts {
    /// Maximum bytes retained across all sizes.
    pub(crate) max_pool_bytes: usize,
    /// Maximum number of retained pixmaps per size.
    pub(crate) max_per_size: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_per_size: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SurfaceSize {
    pub(crate) width: u16,
    pub(crate) height: u16,
}

impl SurfaceSize {
    pub(crate) fn new(width: u32, height: u32) -> DrapeResult<Self> {
        let w = u16::try_from(width)
            .map_err(|_| DrapeError::render(format!("surface width {width} exceeds u16")))?;
        let h = u16::try_from(height)
            .map_err(|_| DrapeError::render(format!("surface height {height} exceeds u16")))?;
        if w == 0 || h == 0 {
            return Err(DrapeError::render("surface must be at least 1x1"));
        }
        Ok(Self {
            width: w,
            height: h,
        })
    }

    fn byte_len(self) -> usize {
        usize::from(self.width) * usize::from(self.height) * 4
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct SurfacePoolStats {
    pub(crate) retained_surfaces: usize,
    pub(crate) retained_bytes: usize,
    pub(crate) allocations: u64,
    pub(crate) dropped_on_release: u64,
}

/// Bounded pool of canvas-sized pixmaps reused across element layers and frames.
///
/// Borrowed pixmaps are cleared to transparent before they are handed out.
pub(crate) struct SurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    free: HashMap<SurfaceSize, Vec<vello_cpu::Pixmap>>,
}

impl std::fmt::Debug for SurfacePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfacePool")
            .field("opts", &self.opts)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Default for SurfacePool {
    fn default() -> Self {
        Self::new(SurfacePoolOpts::default())
    }
}

impl SurfacePool {
    pub(crate) fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            free: HashMap::new(),
        }
    }

    pub(crate) fn stats(&self) -> SurfacePoolStats {
        self.stats.clone()
    }

    pub(crate) fn borrow(&mut self, size: SurfaceSize) -> vello_cpu::Pixmap {
        if let Some(mut p) = self.free.get_mut(&size).and_then(Vec::pop) {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(size.byte_len());
            p.data_as_u8_slice_mut().fill(0);
            return p;
        }
        self.stats.allocations = self.stats.allocations.saturating_add(1);
        vello_cpu::Pixmap::new(size.width, size.height)
    }

    pub(crate) fn release(&mut self, pixmap: vello_cpu::Pixmap) {
        let size = SurfaceSize {
            width: pixmap.width(),
            height: pixmap.height(),
        };
        let bytes = size.byte_len();
        let bucket = self.free.entry(size).or_default();
        if bucket.len() >= self.opts.max_per_size
            || self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes
        {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }
        bucket.push(pixmap);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }

    /// Release every retained pixmap.
    pub(crate) fn purge(&mut self) {
        self.free.clear();
        self.stats.retained_surfaces = 0;
        self.stats.retained_bytes = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
