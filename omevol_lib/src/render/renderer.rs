use std::ops::Range;

use nalgebra::{Point3, Vector3};

use crate::{
    camera::{Camera, ViewFrame},
    color::ColorRgbHdr,
    common::{create_cs, BoundBox, Ray, ValueRange},
    scene::{AppScene, SkyLight, MAX_CHANNELS},
    volumetric::{lut_lookup, ImageXYZC},
};

use super::{DirtyFlags, RenderControl, RenderOptions, RenderParams, RenderSettings};

/// Transmittance under which a ray is considered opaque
const TERMINATION_THRESHOLD: f32 = 0.01;

/// Result of one [`Renderer::render`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStatus {
    /// Number of accumulated iterations
    pub iteration: u32,
    /// Film exposure iterations reached
    pub converged: bool,
    /// An iteration was added during this call
    pub rendered: bool,
}

/// Volume placement, rebuilt on [`DirtyFlags::VOLUME`]
#[derive(Debug, Clone)]
struct VolumeGeometry {
    bound_box: BoundBox,
    /// World size of one voxel along its smallest side
    voxel_world_size: f32,
    /// Voxels per world unit, per axis
    voxel_per_world: Vector3<f32>,
}

/// Area light resolved to world space, rebuilt on [`DirtyFlags::LIGHTS`]
#[derive(Debug, Clone)]
struct ResolvedAreaLight {
    center: Point3<f32>,
    /// Half extents of the light rectangle
    u: Vector3<f32>,
    v: Vector3<f32>,
    radiance: ColorRgbHdr,
}

#[derive(Debug, Clone, Default)]
struct LightCache {
    sky: Option<SkyLight>,
    area: Vec<ResolvedAreaLight>,
}

/// Per-channel transfer function state, rebuilt on [`DirtyFlags::TRANSFER_FUNCTION`]
/// and [`DirtyFlags::VOLUME_DATA`]
#[derive(Debug, Clone, Default)]
struct TransferCache {
    luts: Vec<Vec<f32>>,
    ranges: Vec<ValueRange>,
    roughness: [f32; MAX_CHANNELS],
}

#[derive(Debug, Clone, Default)]
struct RenderCache {
    geometry: Option<VolumeGeometry>,
    /// Enabled channels, rebuilt on [`DirtyFlags::VOLUME_DATA`]
    channels: Vec<usize>,
    transfer: TransferCache,
    lights: LightCache,
}

/// Progressive CPU ray marcher
///
/// Every [`render`](Renderer::render) call adds one jittered sample per pixel
/// to the accumulation buffer and tone maps the average into an RGB8 frame.
pub struct Renderer {
    options: RenderOptions,
    accum: Vec<ColorRgbHdr>,
    frame: Vec<u8>,
    cache: RenderCache,
    seed: u64,
    stream_mode: bool,
    redraw_requested: bool,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Renderer {
        let (width, height) = options.resolution;
        Renderer {
            options,
            accum: vec![ColorRgbHdr::BLACK; width * height],
            frame: vec![0; width * height * 3],
            cache: RenderCache::default(),
            seed: 0x5eed_0f_a11,
            stream_mode: false,
            redraw_requested: false,
        }
    }

    pub fn set_render_options(&mut self, options: RenderOptions) {
        let resolution = options.resolution;
        self.options = options;
        self.resize(resolution.0, resolution.1);
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn resolution(&self) -> (usize, usize) {
        self.options.resolution
    }

    /// RGB8 image, row 0 at the top
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn stream_mode(&self) -> bool {
        self.stream_mode
    }

    /// Returns pending redraw request and clears it
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    fn clear(&mut self) {
        self.accum.fill(ColorRgbHdr::BLACK);
        self.frame.fill(0);
    }

    /// Rebuild caches of every consumed flag
    fn update_cache(&mut self, flags: DirtyFlags, scene: &AppScene) {
        let image = scene.volume.as_ref();

        if flags.contains(DirtyFlags::VOLUME) {
            self.cache.geometry = image.map(|image| volume_geometry(image, scene.bounding_box));
            log::trace!("Volume geometry updated: {:?}", self.cache.geometry);
        }

        if flags.contains(DirtyFlags::VOLUME_DATA) {
            self.cache.channels = scene.enabled_channels();
            log::trace!("Enabled channels: {:?}", self.cache.channels);
        }

        // New voxel data comes with new lookup tables
        if flags.intersects(DirtyFlags::TRANSFER_FUNCTION | DirtyFlags::VOLUME_DATA) {
            let channels = image.map(|image| image.channels()).unwrap_or_default();
            self.cache.transfer = TransferCache {
                luts: channels.iter().map(|c| c.lut().to_vec()).collect(),
                ranges: channels.iter().map(|c| c.range()).collect(),
                roughness: scene.material.roughness,
            };
        }

        if flags.intersects(DirtyFlags::LIGHTS | DirtyFlags::VOLUME) {
            self.cache.lights = resolve_lights(scene);
        }
    }

    /// Add one progressive iteration
    pub fn render(
        &mut self,
        camera: &Camera,
        scene: &AppScene,
        settings: &mut RenderSettings,
    ) -> RenderStatus {
        let flags = settings.take_dirty_flags();
        if !flags.is_empty() {
            self.update_cache(flags, scene);
            settings.set_no_iterations(0);
        }

        let (width, height) = camera.film.resolution;
        if (width, height) != self.options.resolution {
            self.resize(width, height);
            settings.set_no_iterations(0);
        }

        if settings.no_iterations() == 0 {
            self.clear();
        }

        let exposure_iterations = camera.film.exposure_iterations;
        let (image, geometry) = match (scene.volume.as_ref(), self.cache.geometry.as_ref()) {
            (Some(image), Some(geometry)) => (image, geometry),
            _ => {
                self.clear();
                return RenderStatus {
                    iteration: settings.no_iterations(),
                    converged: true,
                    rendered: false,
                };
            }
        };

        if settings.is_converged(exposure_iterations) {
            return RenderStatus {
                iteration: settings.no_iterations(),
                converged: true,
                rendered: false,
            };
        }

        let view = camera.view_frame();
        let (cols, rows) = view
            .project_box(geometry.bound_box)
            .get_pixel_range((width, height));

        let channels = self
            .cache
            .channels
            .iter()
            .filter_map(|&index| {
                Some(ChannelShading {
                    index,
                    lut: self.cache.transfer.luts.get(index)?,
                    range: *self.cache.transfer.ranges.get(index)?,
                    diffuse: scene.material.diffuse[index],
                    specular: scene.material.specular[index],
                    emissive: scene.material.emissive[index],
                    roughness: self.cache.transfer.roughness[index],
                })
            })
            .collect();

        let ctx = FrameContext {
            view,
            image,
            geometry,
            channels,
            lights: &self.cache.lights,
            params: settings.params,
            ray_termination: self.options.ray_termination,
            exposure: f32::max(camera.film.exposure, f32::EPSILON),
            resolution: (width, height),
            rows,
            cols,
            iteration: settings.no_iterations(),
            seed: self.seed,
        };

        if self.options.multi_thread {
            let workers = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4);
            let rows_per_band = usize::max(1, (height + workers - 1) / workers);
            let band_len = rows_per_band * width;
            let ctx = &ctx;

            // Scope assures threads will be joined before exiting the scope
            let result = crossbeam::scope(|s| {
                let bands = self
                    .accum
                    .chunks_mut(band_len)
                    .zip(self.frame.chunks_mut(band_len * 3));
                for (band, (accum, frame)) in bands.enumerate() {
                    s.spawn(move |_| ctx.render_rows(band * rows_per_band, accum, frame));
                }
            });
            if let Err(panic) = result {
                std::panic::resume_unwind(panic);
            }
        } else {
            ctx.render_rows(0, &mut self.accum, &mut self.frame);
        }

        settings.increment_iterations();

        RenderStatus {
            iteration: settings.no_iterations(),
            converged: settings.is_converged(exposure_iterations),
            rendered: true,
        }
    }
}

impl RenderControl for Renderer {
    fn set_stream_mode(&mut self, stream: bool) {
        self.stream_mode = stream;
    }

    fn resize(&mut self, width: usize, height: usize) {
        let (width, height) = (usize::max(width, 1), usize::max(height, 1));
        self.options.resolution = (width, height);
        self.accum = vec![ColorRgbHdr::BLACK; width * height];
        self.frame = vec![0; width * height * 3];
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }
}

fn volume_geometry(image: &ImageXYZC, bound_box: BoundBox) -> VolumeGeometry {
    let size = image.size().map(|v| v as f32);
    let dims = bound_box.dims();
    let voxel_per_world = size.component_div(&dims).map(|v| if v.is_finite() { v } else { 0.0 });
    let voxel_world_size = dims.component_div(&size).min();

    VolumeGeometry {
        bound_box,
        voxel_world_size,
        voxel_per_world,
    }
}

fn resolve_lights(scene: &AppScene) -> LightCache {
    let target = scene.bounding_box.center();
    let sky = scene.lighting.sky_light().ok().cloned();

    let area = scene
        .lighting
        .area_lights()
        .map(|light| {
            let center = light.world_position(&target);
            let normal = (target - center)
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(|| Vector3::new(0.0, 0.0, -1.0));
            let (u, v) = create_cs(&normal);
            ResolvedAreaLight {
                center,
                u: u * (0.5 * light.width),
                v: v * (0.5 * light.height),
                radiance: light.radiance(),
            }
        })
        .collect();

    LightCache { sky, area }
}

/// Channel parameters needed while shading one frame
struct ChannelShading<'a> {
    index: usize,
    lut: &'a [f32],
    range: ValueRange,
    diffuse: ColorRgbHdr,
    specular: ColorRgbHdr,
    emissive: ColorRgbHdr,
    roughness: f32,
}

/// Material at one sample point, blended over the visible channels
struct SamplePoint {
    /// Sum of channel opacities
    sigma: f32,
    diffuse: ColorRgbHdr,
    specular: ColorRgbHdr,
    emissive: ColorRgbHdr,
    roughness: f32,
    /// Channel with the highest opacity, provides the gradient
    dominant: usize,
}

/// Everything one iteration reads, shared by worker threads
struct FrameContext<'a> {
    view: ViewFrame,
    image: &'a ImageXYZC,
    geometry: &'a VolumeGeometry,
    channels: Vec<ChannelShading<'a>>,
    lights: &'a LightCache,
    params: RenderParams,
    ray_termination: bool,
    exposure: f32,
    resolution: (usize, usize),
    rows: Range<usize>,
    cols: Range<usize>,
    iteration: u32,
    seed: u64,
}

impl FrameContext<'_> {
    fn row_seed(&self, row: usize) -> u64 {
        let key = ((self.iteration as u64) << 32) ^ row as u64;
        (key ^ self.seed).wrapping_mul(0x9e37_79b9_7f4a_7c15)
    }

    /// Trace rows starting at `first_row`, `accum` and `frame` hold exactly those rows
    fn render_rows(&self, first_row: usize, accum: &mut [ColorRgbHdr], frame: &mut [u8]) {
        let (width, height) = self.resolution;
        let (width_f, height_f) = (width as f32, height as f32);
        let samples = (self.iteration + 1) as f32;

        let rows = accum.chunks_mut(width).zip(frame.chunks_mut(width * 3));
        for (i, (accum_row, frame_row)) in rows.enumerate() {
            let y = first_row + i;
            let mut rng = fastrand::Rng::with_seed(self.row_seed(y));
            let row_visible = self.rows.contains(&y);

            for x in 0..width {
                if row_visible && self.cols.contains(&x) {
                    let pixel = ((x as f32 + rng.f32()) / width_f, (y as f32 + rng.f32()) / height_f);
                    let lens = (2.0 * rng.f32() - 1.0, 2.0 * rng.f32() - 1.0);
                    let ray = self.view.get_ray(pixel, lens).with_pixel(y * width + x);
                    accum_row[x] += self.trace(&ray, &mut rng);
                }

                let color = tone_map(accum_row[x] / samples, self.exposure);
                frame_row[3 * x] = color[0];
                frame_row[3 * x + 1] = color[1];
                frame_row[3 * x + 2] = color[2];
            }
        }
    }

    fn voxel(&self, pos: Point3<f32>) -> Point3<f32> {
        self.image.world_to_voxel(&self.geometry.bound_box, pos)
    }

    fn sample(&self, pos: Point3<f32>) -> Option<SamplePoint> {
        let voxel = self.voxel(pos);

        let mut point = SamplePoint {
            sigma: 0.0,
            diffuse: ColorRgbHdr::BLACK,
            specular: ColorRgbHdr::BLACK,
            emissive: ColorRgbHdr::BLACK,
            roughness: 0.0,
            dominant: 0,
        };
        let mut best = 0.0;

        for channel in &self.channels {
            let raw = self.image.sample_at(channel.index, voxel);
            let opacity = lut_lookup(channel.lut, channel.range.normalize(raw));
            if opacity <= 0.0 {
                continue;
            }
            point.sigma += opacity;
            point.diffuse += channel.diffuse * opacity;
            point.specular += channel.specular * opacity;
            point.emissive += channel.emissive * opacity;
            point.roughness += channel.roughness * opacity;
            if opacity > best {
                best = opacity;
                point.dominant = channel.index;
            }
        }

        if point.sigma <= 0.0 {
            return None;
        }

        let inv = 1.0 / point.sigma;
        point.diffuse *= inv;
        point.specular *= inv;
        point.emissive *= inv;
        point.roughness *= inv;
        Some(point)
    }

    fn density(&self, pos: Point3<f32>) -> f32 {
        let voxel = self.voxel(pos);
        self.channels
            .iter()
            .map(|channel| {
                let raw = self.image.sample_at(channel.index, voxel);
                lut_lookup(channel.lut, channel.range.normalize(raw))
            })
            .sum()
    }

    /// World space normal facing against `view_dir`, `None` in homogeneous regions
    fn normal(&self, channel: usize, pos: Point3<f32>, view_dir: &Vector3<f32>) -> Option<Vector3<f32>> {
        let gradient = self
            .image
            .sample_gradient(channel, self.voxel(pos))
            .component_mul(&self.geometry.voxel_per_world);
        let normal = gradient.try_normalize(1e-6)?;
        if normal.dot(view_dir) > 0.0 {
            Some(-normal)
        } else {
            Some(normal)
        }
    }

    /// Fraction of light passing from `pos` towards `light_pos`
    fn transmittance(&self, pos: Point3<f32>, light_pos: Point3<f32>, rng: &mut fastrand::Rng) -> f32 {
        let to_light = light_pos - pos;
        let distance = to_light.magnitude();
        if distance <= f32::EPSILON {
            return 1.0;
        }
        let shadow_ray = Ray::new(pos, to_light / distance).with_range(0.0, distance);
        let (t0, t1) = match shadow_ray.clip(&self.geometry.bound_box) {
            Some(range) => range,
            None => return 1.0,
        };

        let step = self.params.step_size_secondary * self.geometry.voxel_world_size;
        if step <= 0.0 {
            return 1.0;
        }
        let mut optical_depth = 0.0;
        let mut t = t0 + step * rng.f32();
        while t < t1 {
            optical_depth += self.density(shadow_ray.point_from_t(t)) * self.params.density_scale * step;
            t += step;
        }
        f32::exp(-optical_depth)
    }

    fn shade(&self, point: &SamplePoint, pos: Point3<f32>, ray: &Ray, rng: &mut fastrand::Rng) -> ColorRgbHdr {
        let gradient_factor = self.params.gradient_factor.clamp(0.0, 1.0);
        let normal = self.normal(point.dominant, pos, &ray.direction);

        let mut radiance = point.emissive;

        if let Some(sky) = &self.lights.sky {
            let ambient = match &normal {
                Some(n) => sky.radiance(n),
                None => sky.color_middle,
            };
            radiance += point.diffuse * ambient;
        }

        let shininess = 1.0 + (1.0 - point.roughness.clamp(0.0, 1.0)).powi(2) * 255.0;

        for light in &self.lights.area {
            let sample = light.center
                + light.u * (2.0 * rng.f32() - 1.0)
                + light.v * (2.0 * rng.f32() - 1.0);
            let to_light = match (sample - pos).try_normalize(f32::EPSILON) {
                Some(dir) => dir,
                None => continue,
            };

            let visibility = self.transmittance(pos, sample, rng);
            if visibility <= 0.0 {
                continue;
            }

            let (diffuse_term, specular_term) = match &normal {
                Some(n) => {
                    let n_dot_l = f32::max(n.dot(&to_light), 0.0);
                    let half = (to_light - ray.direction).try_normalize(f32::EPSILON);
                    let n_dot_h = half.map_or(0.0, |h| f32::max(n.dot(&h), 0.0));
                    (
                        1.0 - gradient_factor + gradient_factor * n_dot_l,
                        gradient_factor * n_dot_h.powf(shininess),
                    )
                }
                None => (1.0, 0.0),
            };

            radiance += light.radiance
                * visibility
                * (point.diffuse * diffuse_term + point.specular * specular_term);
        }

        radiance
    }

    /// Front to back compositing along `ray`
    fn trace(&self, ray: &Ray, rng: &mut fastrand::Rng) -> ColorRgbHdr {
        let mut color = ColorRgbHdr::BLACK;

        let (t0, t1) = match ray.clip(&self.geometry.bound_box) {
            Some(range) => range,
            None => return color,
        };

        let step = self.params.step_size_primary * self.geometry.voxel_world_size;
        if step <= 0.0 {
            return color;
        }

        let mut transmittance = 1.0;
        let mut t = t0 + step * rng.f32();

        while t < t1 {
            let pos = ray.point_from_t(t);
            t += step;

            let point = match self.sample(pos) {
                Some(point) => point,
                None => continue,
            };

            let opacity = 1.0 - f32::exp(-point.sigma * self.params.density_scale * step);
            let radiance = self.shade(&point, pos, ray, rng);

            color += radiance * (transmittance * opacity);
            transmittance *= 1.0 - opacity;

            // relying on branch predictor to "eliminate" branch
            if self.ray_termination && transmittance < TERMINATION_THRESHOLD {
                break;
            }
        }

        color
    }
}

/// Exponential tone mapping `1 - exp(-c / exposure)` into 8 bits
fn tone_map(color: ColorRgbHdr, exposure: f32) -> [u8; 3] {
    let map = |c: f32| ((1.0 - f32::exp(-f32::max(c, 0.0) / exposure)) * 255.0).round() as u8;
    [map(color.r), map(color.g), map(color.b)]
}

#[cfg(test)]
mod test {

    use nalgebra::vector;

    use super::*;
    use crate::{
        color,
        test_helpers::{solid_scene, unlit_scene},
        transfer::{GradientStop, GradientStops},
    };

    fn small_camera(scene: &AppScene) -> Camera {
        let mut camera = Camera::new(16, 16);
        camera.frame_scene(scene.bounding_box);
        camera.film.exposure_iterations = 4;
        camera
    }

    fn single_thread() -> RenderOptions {
        RenderOptions::new((16, 16), true, false)
    }

    #[test]
    fn tone_mapping() {
        assert_eq!(tone_map(ColorRgbHdr::BLACK, 0.75), [0, 0, 0]);
        assert_eq!(tone_map(ColorRgbHdr::splat(100.0), 0.75), [255, 255, 255]);

        let mid = tone_map(ColorRgbHdr::splat(0.75), 0.75)[0];
        assert_eq!(mid, ((1.0 - f32::exp(-1.0)) * 255.0).round() as u8);
    }

    #[test]
    fn empty_scene_is_black() {
        let scene = AppScene::default();
        let camera = Camera::new(16, 16);
        let mut settings = RenderSettings::default();
        let mut renderer = Renderer::new(single_thread());

        let status = renderer.render(&camera, &scene, &mut settings);

        assert!(!status.rendered);
        assert!(renderer.frame().iter().all(|&v| v == 0));
    }

    #[test]
    fn solid_volume_visible_in_center() {
        let scene = solid_scene(vector![8, 8, 8]);
        let camera = small_camera(&scene);
        let mut settings = RenderSettings::default();
        let mut renderer = Renderer::new(single_thread());

        let status = renderer.render(&camera, &scene, &mut settings);

        assert!(status.rendered);
        assert_eq!(status.iteration, 1);
        let center = (8 * 16 + 8) * 3;
        assert!(renderer.frame()[center] > 0);
        // corner is outside of the projected box
        assert_eq!(&renderer.frame()[0..3], &[0, 0, 0]);
    }

    #[test]
    fn converges_after_exposure_iterations() {
        let scene = solid_scene(vector![4, 4, 4]);
        let camera = small_camera(&scene);
        let mut settings = RenderSettings::default();
        let mut renderer = Renderer::new(single_thread());

        let mut status = renderer.render(&camera, &scene, &mut settings);
        while status.rendered && !status.converged {
            status = renderer.render(&camera, &scene, &mut settings);
        }

        assert!(status.converged);
        assert_eq!(settings.no_iterations(), 4);

        let after = renderer.render(&camera, &scene, &mut settings);
        assert!(!after.rendered);
        assert_eq!(after.iteration, 4);
    }

    #[test]
    fn dirty_flag_restarts_accumulation() {
        let mut scene = solid_scene(vector![4, 4, 4]);
        let camera = small_camera(&scene);
        let mut settings = RenderSettings::default();
        let mut renderer = Renderer::new(single_thread());

        renderer.render(&camera, &scene, &mut settings);
        renderer.render(&camera, &scene, &mut settings);
        assert_eq!(settings.no_iterations(), 2);

        scene.material.enabled[0] = false;
        settings.set_flag(DirtyFlags::VOLUME_DATA);
        let status = renderer.render(&camera, &scene, &mut settings);

        assert_eq!(status.iteration, 1);
        assert!(settings.dirty_flags().is_empty());
        // only channel switched off, nothing left to see
        assert!(renderer.frame().iter().all(|&v| v == 0));
    }

    fn render_until_converged(renderer: &mut Renderer, camera: &Camera, scene: &AppScene, settings: &mut RenderSettings) {
        let mut status = renderer.render(camera, scene, settings);
        while status.rendered && !status.converged {
            status = renderer.render(camera, scene, settings);
        }
    }

    fn center_pixel(renderer: &Renderer) -> [u8; 3] {
        let center = (8 * 16 + 8) * 3;
        let frame = renderer.frame();
        [frame[center], frame[center + 1], frame[center + 2]]
    }

    #[test]
    fn transfer_function_change_reaches_renderer() {
        let mut scene = solid_scene(vector![4, 4, 4]);
        let camera = small_camera(&scene);
        let mut settings = RenderSettings::default();
        let mut renderer = Renderer::new(single_thread());

        render_until_converged(&mut renderer, &camera, &scene, &mut settings);
        assert!(center_pixel(&renderer).iter().any(|&v| v > 0));

        let transparent = GradientStops::new(vec![
            GradientStop::new(0.0, color::zero()),
            GradientStop::new(1.0, color::zero()),
        ])
        .unwrap();
        scene
            .volume
            .as_mut()
            .unwrap()
            .channel_mut(0)
            .unwrap()
            .generate_control_points(transparent);
        settings.set_flag(DirtyFlags::TRANSFER_FUNCTION);

        let status = renderer.render(&camera, &scene, &mut settings);

        assert_eq!(status.iteration, 1);
        assert!(renderer.frame().iter().all(|&v| v == 0));
    }

    #[test]
    fn sky_color_change_reaches_renderer() {
        let mut scene = unlit_scene(vector![4, 4, 4], ColorRgbHdr::BLACK);
        scene.material.diffuse[0] = ColorRgbHdr::WHITE;
        let camera = small_camera(&scene);
        let mut settings = RenderSettings::default();
        let mut renderer = Renderer::new(single_thread());

        render_until_converged(&mut renderer, &camera, &scene, &mut settings);
        assert_eq!(center_pixel(&renderer), [0, 0, 0]);

        let set_sky = |scene: &mut AppScene, color: ColorRgbHdr| {
            let sky = scene.lighting.sky_light_mut().unwrap();
            sky.color_top = color;
            sky.color_middle = color;
            sky.color_bottom = color;
        };

        set_sky(&mut scene, ColorRgbHdr::new(0.0, 1.0, 0.0));
        settings.set_flag(DirtyFlags::LIGHTS);
        render_until_converged(&mut renderer, &camera, &scene, &mut settings);
        let [r, g, b] = center_pixel(&renderer);
        assert!(g > 0);
        assert_eq!((r, b), (0, 0));

        set_sky(&mut scene, ColorRgbHdr::new(1.0, 0.0, 0.0));
        settings.set_flag(DirtyFlags::LIGHTS);
        render_until_converged(&mut renderer, &camera, &scene, &mut settings);
        let [r, g, b] = center_pixel(&renderer);
        assert!(r > 0);
        assert_eq!((g, b), (0, 0));
    }

    #[test]
    fn emissive_only_scene() {
        let scene = unlit_scene(vector![4, 4, 4], ColorRgbHdr::new(1.0, 0.0, 0.0));
        let camera = small_camera(&scene);
        let mut settings = RenderSettings::default();
        let mut renderer = Renderer::new(single_thread());

        renderer.render(&camera, &scene, &mut settings);

        let center = (8 * 16 + 8) * 3;
        let pixel = &renderer.frame()[center..center + 3];
        assert!(pixel[0] > 0);
        assert_eq!(pixel[1], 0);
        assert_eq!(pixel[2], 0);
    }

    #[test]
    fn multi_thread_matches_single_thread() {
        let scene = solid_scene(vector![6, 6, 6]);
        let camera = small_camera(&scene);

        let mut single = Renderer::new(single_thread());
        let mut settings = RenderSettings::default();
        single.render(&camera, &scene, &mut settings);

        let mut multi = Renderer::new(RenderOptions::new((16, 16), true, true));
        let mut settings = RenderSettings::default();
        multi.render(&camera, &scene, &mut settings);

        assert_eq!(single.frame(), multi.frame());
    }

    #[test]
    fn film_resize_follows_camera() {
        let scene = solid_scene(vector![4, 4, 4]);
        let mut camera = small_camera(&scene);
        camera.film.set_resolution(8, 4);
        let mut settings = RenderSettings::default();
        let mut renderer = Renderer::new(single_thread());

        renderer.render(&camera, &scene, &mut settings);

        assert_eq!(renderer.resolution(), (8, 4));
        assert_eq!(renderer.frame().len(), 8 * 4 * 3);
    }

    #[test]
    fn control_requests() {
        let mut renderer = Renderer::new(single_thread());

        renderer.set_stream_mode(true);
        renderer.request_redraw();

        assert!(renderer.stream_mode());
        assert!(renderer.take_redraw_request());
        assert!(!renderer.take_redraw_request());
    }
}
