use bitflags::bitflags;

bitflags! {
    /// Parts of the scene changed since the last rendered iteration
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u32 {
        /// Volume geometry, bounding box or size
        const VOLUME = 1 << 0;
        /// Voxel data or the set of enabled channels
        const VOLUME_DATA = 1 << 1;
        /// Channel lookup tables or roughness
        const TRANSFER_FUNCTION = 1 << 2;
        const LIGHTS = 1 << 3;
    }
}

impl Default for DirtyFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Ray marching parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    /// Multiplier of the transfer function opacity
    pub density_scale: f32,
    /// Step of primary rays, in voxels
    pub step_size_primary: f32,
    /// Step of shadow rays, in voxels
    pub step_size_secondary: f32,
    /// Blend between unshaded (0) and gradient shaded (1) samples
    pub gradient_factor: f32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            density_scale: 50.0,
            step_size_primary: 1.0,
            step_size_secondary: 2.0,
            gradient_factor: 0.5,
        }
    }
}

/// Progressive rendering state shared by commands and the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    dirty_flags: DirtyFlags,
    no_iterations: u32,
    pub params: RenderParams,
}

impl Default for RenderSettings {
    /// Everything starts dirty so the first iteration builds all caches
    fn default() -> Self {
        Self {
            dirty_flags: DirtyFlags::all(),
            no_iterations: 0,
            params: RenderParams::default(),
        }
    }
}

impl RenderSettings {
    pub fn new(params: RenderParams) -> RenderSettings {
        RenderSettings {
            params,
            ..Default::default()
        }
    }

    pub fn no_iterations(&self) -> u32 {
        self.no_iterations
    }

    /// Setting 0 restarts progressive accumulation
    pub fn set_no_iterations(&mut self, no_iterations: u32) {
        self.no_iterations = no_iterations;
    }

    pub fn increment_iterations(&mut self) {
        self.no_iterations = self.no_iterations.saturating_add(1);
    }

    pub fn set_flag(&mut self, flag: DirtyFlags) {
        self.dirty_flags.insert(flag);
    }

    pub fn has_flag(&self, flag: DirtyFlags) -> bool {
        self.dirty_flags.contains(flag)
    }

    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty_flags
    }

    /// Return pending flags and clear them
    pub fn take_dirty_flags(&mut self) -> DirtyFlags {
        std::mem::take(&mut self.dirty_flags)
    }

    /// Image reached the requested number of iterations
    pub fn is_converged(&self, exposure_iterations: u32) -> bool {
        self.no_iterations >= exposure_iterations
    }
}
