use choreo_core::config::ChoreoConfig;
use choreo_core::interaction::PointerEvent;
use choreo_core::render::{pack_particles, FrameUniforms, GpuParticle};
use choreo_core::shapes::font::FontRasterizer;
use choreo_core::{ChoreographyUnit, Scene, SceneEvent, ScenePhase, SceneSignal, UnitKind};
use wasm_bindgen::prelude::*;

const UNITS: [UnitKind; 4] = [
    UnitKind::Main,
    UnitKind::Halo,
    UnitKind::Snow,
    UnitKind::Celebration,
];

fn unit_from_id(id: u32) -> Option<UnitKind> {
    UNITS.get(id as usize).copied()
}

fn scene_phase_from_id(id: u32) -> ScenePhase {
    match id {
        1 => ScenePhase::Morphing,
        2 => ScenePhase::Tree,
        3 => ScenePhase::Celebration,
        _ => ScenePhase::Intro,
    }
}

fn entropy_seed() -> u64 {
    let mut bytes = [0u8; 8];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes),
        Err(_) => js_sys::Date::now() as u64,
    }
}

fn log_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    let message = format!("{}: {}", context, err);
    web_sys::console::error_1(&message.clone().into());
    JsValue::from_str(&message)
}

#[wasm_bindgen]
pub struct ChoreoWorld {
    scene: Scene,
    /// One attribute buffer per unit, indexed like `UNITS`.
    gpu_buffers: Vec<Vec<GpuParticle>>,
    uniforms: [FrameUniforms; 4],
    signals: Vec<SceneSignal>,
}

#[wasm_bindgen]
impl ChoreoWorld {
    /// `config_json` may be empty for defaults; `seed` 0 draws from entropy.
    #[wasm_bindgen(constructor)]
    pub fn new(font: Vec<u8>, config_json: &str, seed: u64) -> Result<ChoreoWorld, JsValue> {
        let config: ChoreoConfig = if config_json.trim().is_empty() {
            ChoreoConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(|e| log_error("config", e))?
        };
        let rasterizer = FontRasterizer::from_bytes(font).map_err(|e| log_error("font", e))?;
        let seed = if seed == 0 { entropy_seed() } else { seed };
        let scene = Scene::new(config, Box::new(rasterizer), seed)
            .map_err(|e| log_error("scene", e))?;

        let mut world = ChoreoWorld {
            scene,
            gpu_buffers: vec![Vec::new(); UNITS.len()],
            uniforms: [FrameUniforms::default(); 4],
            signals: Vec::new(),
        };
        world.write_gpu_buffers();

        web_sys::console::log_1(
            &format!(
                "WASM ChoreoWorld created: {} main / {} halo / {} snow / {} celebration particles",
                world.gpu_buffers[0].len(),
                world.gpu_buffers[1].len(),
                world.gpu_buffers[2].len(),
                world.gpu_buffers[3].len(),
            )
            .into(),
        );
        Ok(world)
    }

    /// Advance one frame. Returns the time spent in milliseconds.
    #[wasm_bindgen]
    pub fn tick(&mut self, time: f32, dt: f32) -> f32 {
        let start = js_sys::Date::now();
        let signals = self.scene.tick(time, dt);
        self.signals.extend(signals);
        for (slot, kind) in self.uniforms.iter_mut().zip(UNITS) {
            *slot = *self.scene.unit(kind).choreography().uniforms();
        }
        // Spiral parameters and respawn offsets change every frame.
        self.write_unit_buffer(1);
        (js_sys::Date::now() - start) as f32
    }

    #[wasm_bindgen]
    pub fn set_scene_phase(&mut self, phase: u32, time: f32) {
        self.scene.handle(SceneEvent::Phase(scene_phase_from_id(phase)), time);
    }

    #[wasm_bindgen]
    pub fn explode(&mut self, time: f32) {
        self.scene.handle(SceneEvent::Explode, time);
    }

    #[wasm_bindgen]
    pub fn reassemble(&mut self, time: f32) {
        self.scene.handle(SceneEvent::Reassemble, time);
    }

    #[wasm_bindgen]
    pub fn restart(&mut self, time: f32) {
        self.scene.handle(SceneEvent::Restart, time);
    }

    /// `palette_json` is a serialized `Palette`.
    #[wasm_bindgen]
    pub fn set_palette(&mut self, palette_json: &str, time: f32) -> Result<(), JsValue> {
        let palette = serde_json::from_str(palette_json).map_err(|e| log_error("palette", e))?;
        self.scene.handle(SceneEvent::PaletteChanged(palette), time);
        self.write_gpu_buffers();
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_text_width(&mut self, width: f32, time: f32) {
        self.scene.handle(SceneEvent::TextWidth(width), time);
        self.write_unit_buffer(0);
    }

    #[wasm_bindgen]
    pub fn pointer_down(&mut self, x: f32, y: f32, time: f32) {
        self.scene.handle(SceneEvent::Pointer(PointerEvent::Down { x, y }), time);
    }

    #[wasm_bindgen]
    pub fn pointer_move(&mut self, x: f32, y: f32, time: f32) {
        self.scene.handle(SceneEvent::Pointer(PointerEvent::Move { x, y }), time);
    }

    #[wasm_bindgen]
    pub fn pointer_up(&mut self, time: f32) {
        self.scene.handle(SceneEvent::Pointer(PointerEvent::Up), time);
    }

    #[wasm_bindgen]
    pub fn set_hover(&mut self, hovering: bool, time: f32) {
        self.scene.handle(SceneEvent::Pointer(PointerEvent::Hover(hovering)), time);
    }

    /// Progress to report while `unit` waits in a held phase.
    #[wasm_bindgen]
    pub fn set_held_progress(&mut self, unit: u32, progress: f32) {
        if let Some(kind) = unit_from_id(unit) {
            self.scene.set_held_progress(kind, progress);
        }
    }

    /// Signals raised since the last call, as a JSON array.
    #[wasm_bindgen]
    pub fn drain_signals(&mut self) -> String {
        let signals = std::mem::take(&mut self.signals);
        serde_json::to_string(&signals).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen]
    pub fn progress(&self) -> f32 {
        self.scene.progress()
    }

    #[wasm_bindgen]
    pub fn rotation(&self) -> f32 {
        self.scene.rotation()
    }

    #[wasm_bindgen]
    pub fn is_idle(&self) -> bool {
        self.scene.is_idle()
    }

    #[wasm_bindgen]
    pub fn particle_count(&self, unit: u32) -> usize {
        self.gpu_buffers.get(unit as usize).map_or(0, Vec::len)
    }

    #[wasm_bindgen]
    pub fn get_gpu_buffer_ptr(&self, unit: u32) -> *const f32 {
        match self.gpu_buffers.get(unit as usize) {
            Some(buffer) => buffer.as_ptr() as *const f32,
            None => std::ptr::null(),
        }
    }

    #[wasm_bindgen]
    pub fn get_gpu_buffer_byte_length(&self, unit: u32) -> usize {
        self.gpu_buffers
            .get(unit as usize)
            .map_or(0, |b| bytemuck::cast_slice::<GpuParticle, u8>(b).len())
    }

    #[wasm_bindgen]
    pub fn get_uniforms_ptr(&self, unit: u32) -> *const f32 {
        match self.uniforms.get(unit as usize) {
            Some(uniforms) => uniforms as *const FrameUniforms as *const f32,
            None => std::ptr::null(),
        }
    }

    #[wasm_bindgen]
    pub fn get_uniforms_byte_length(&self) -> usize {
        std::mem::size_of::<FrameUniforms>()
    }
}

impl ChoreoWorld {
    fn write_gpu_buffers(&mut self) {
        for id in 0..UNITS.len() as u32 {
            self.write_unit_buffer(id);
        }
    }

    fn write_unit_buffer(&mut self, id: u32) {
        let Some(kind) = unit_from_id(id) else {
            return;
        };
        if let Some(buffer) = self.gpu_buffers.get_mut(id as usize) {
            pack_particles(self.scene.unit(kind).choreography().field(), buffer);
        }
    }
}
