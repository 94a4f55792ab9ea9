use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use image::GenericImageView;

use crate::{
    native::{AllocationRequest, Capability, NativeAllocator, RawHandle, ResourceType},
    video::{Area, BlendMode, Color, PixelFormat, TextureAccess},
};

type Allocation = std::result::Result<Record, String>;

/// Allocator that keeps every resource as an in-memory record.
#[derive(Debug)]
pub struct SoftwareBackend {
    state: Mutex<State>,
    render_targets: bool,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    live: HashMap<RawHandle, Record>,
    releases: HashMap<RawHandle, usize>,
    failures: HashMap<ResourceType, String>,
}

#[derive(Debug, Clone)]
struct Record {
    kind: ResourceType,
    size: Area,
    format: PixelFormat,
    access: TextureAccess,
    alpha: u8,
    blend_mode: BlendMode,
    color: Color,
    point_size: u32,
    volume: u8,
    playing: bool,
    fading: bool,
    title: String,
}

impl Record {
    fn new(kind: ResourceType) -> Self {
        Self {
            kind,
            size: Area::default(),
            format: PixelFormat::Unknown,
            access: TextureAccess::Static,
            alpha: 0xFF,
            blend_mode: BlendMode::None,
            color: Color::WHITE,
            point_size: 0,
            volume: 128,
            playing: false,
            fading: false,
            title: String::new(),
        }
    }

    fn pixels(kind: ResourceType, size: Area, format: PixelFormat, access: TextureAccess) -> Self {
        Self {
            size,
            format,
            access,
            ..Self::new(kind)
        }
    }
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            render_targets: true,
        }
    }

    /// Enables or disables support for render target textures.
    pub fn with_render_targets(mut self, enabled: bool) -> Self {
        self.render_targets = enabled;
        self
    }

    /// Makes every future allocation of `kind` fail with `diagnostic`.
    pub fn fail_allocations(&self, kind: ResourceType, diagnostic: impl Into<String>) {
        self.state().failures.insert(kind, diagnostic.into());
    }

    /// Number of resources allocated and not yet released.
    pub fn outstanding(&self) -> usize {
        self.state().live.len()
    }

    pub fn outstanding_of(&self, kind: ResourceType) -> usize {
        self.state()
            .live
            .values()
            .filter(|record| record.kind == kind)
            .count()
    }

    /// How often `raw` has been passed to [`NativeAllocator::release`].
    pub fn release_count(&self, raw: RawHandle) -> usize {
        self.state().releases.get(&raw).copied().unwrap_or(0)
    }

    pub fn is_live(&self, raw: RawHandle) -> bool {
        self.state().live.contains_key(&raw)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T>(&self, raw: RawHandle, f: impl FnOnce(&Record) -> T) -> Option<T> {
        self.state().live.get(&raw).map(f)
    }

    fn write(&self, raw: RawHandle, f: impl FnOnce(&mut Record)) -> bool {
        match self.state().live.get_mut(&raw) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    fn source(&self, raw: RawHandle, expected: &[ResourceType]) -> Allocation {
        match self.read(raw, Record::clone) {
            Some(record) if expected.contains(&record.kind) => Ok(record),
            Some(record) => Err(format!("{raw} is a {}", record.kind)),
            None => Err(format!("{raw} is not a live resource")),
        }
    }

    fn build(&self, kind: ResourceType, request: &AllocationRequest<'_>) -> Allocation {
        use ResourceType as T;

        match (kind, *request) {
            (T::Texture | T::Surface, AllocationRequest::File(path)) => {
                let (width, height) = image::image_dimensions(path)
                    .map_err(|err| format!("couldn't load image `{}`: {err}", path.display()))?;
                Ok(decoded(kind, width, height))
            }
            (T::Texture | T::Surface, AllocationRequest::Memory(bytes)) => {
                let image = image::load_from_memory(bytes)
                    .map_err(|err| format!("couldn't decode image: {err}"))?;
                let (width, height) = image.dimensions();
                Ok(decoded(kind, width, height))
            }
            (T::Texture | T::Surface, AllocationRequest::Blank { size, format, access }) => {
                if size.is_empty() {
                    return Err(format!("{kind} dimensions must be non-zero, got {size}"));
                }
                if format == PixelFormat::Unknown {
                    return Err("unknown pixel format".to_string());
                }
                let access = if kind == T::Texture {
                    access
                } else {
                    TextureAccess::Static
                };
                Ok(Record::pixels(kind, size, format, access))
            }
            (T::Texture, AllocationRequest::FromSurface(raw)) => {
                let surface = self.source(raw, &[T::Surface])?;
                Ok(Record::pixels(
                    kind,
                    surface.size,
                    surface.format,
                    TextureAccess::Static,
                ))
            }
            (T::Surface, AllocationRequest::Convert { source, format }) => {
                if format == PixelFormat::Unknown {
                    return Err("unknown pixel format".to_string());
                }
                let surface = self.source(source, &[T::Surface])?;
                Ok(Record { format, ..surface })
            }
            (_, AllocationRequest::Duplicate(raw)) => {
                let original = self.source(raw, &[kind])?;
                Ok(Record {
                    playing: false,
                    fading: false,
                    ..original
                })
            }
            (T::Font, AllocationRequest::Font { path, point_size }) => {
                if point_size == 0 {
                    return Err("point size must be positive".to_string());
                }
                read_file(path)?;
                Ok(Record {
                    point_size,
                    ..Record::new(kind)
                })
            }
            (T::SoundEffect | T::Music, AllocationRequest::File(path)) => {
                read_file(path)?;
                Ok(Record::new(kind))
            }
            (T::SoundEffect | T::Music, AllocationRequest::Memory(bytes)) => {
                if bytes.is_empty() {
                    return Err("audio buffer is empty".to_string());
                }
                Ok(Record::new(kind))
            }
            (T::Window, AllocationRequest::Window { title, size }) => {
                if size.is_empty() {
                    return Err(format!("window dimensions must be non-zero, got {size}"));
                }
                Ok(Record {
                    size,
                    title: title.to_owned(),
                    ..Record::new(kind)
                })
            }
            _ => Err(format!("a {kind} cannot be created from {}", request.origin())),
        }
    }
}

fn decoded(kind: ResourceType, width: u32, height: u32) -> Record {
    Record::pixels(
        kind,
        Area::new(width, height),
        PixelFormat::Rgba32,
        TextureAccess::Static,
    )
}

fn read_file(path: &Path) -> std::result::Result<Vec<u8>, String> {
    let bytes =
        fs::read(path).map_err(|err| format!("couldn't open `{}`: {err}", path.display()))?;
    if bytes.is_empty() {
        return Err(format!("`{}` is empty", path.display()));
    }
    Ok(bytes)
}

impl NativeAllocator for SoftwareBackend {
    fn allocate(
        &self,
        kind: ResourceType,
        request: &AllocationRequest<'_>,
    ) -> std::result::Result<RawHandle, String> {
        if let Some(diagnostic) = self.state().failures.get(&kind) {
            return Err(diagnostic.clone());
        }

        let record = self.build(kind, request)?;

        let mut state = self.state();
        state.next_id += 1;
        let raw = RawHandle::from_bits(state.next_id);
        state.live.insert(raw, record);
        Ok(raw)
    }

    fn release(&self, kind: ResourceType, raw: RawHandle) {
        let mut state = self.state();
        *state.releases.entry(raw).or_default() += 1;

        match state.live.remove(&raw) {
            Some(record) if record.kind == kind => {}
            Some(record) => {
                tracing::warn!(%raw, expected = %kind, actual = %record.kind, "released with the wrong routine");
            }
            None => tracing::warn!(%raw, %kind, "released an unknown resource"),
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::RenderTargets => self.render_targets,
        }
    }

    fn query_dimensions(&self, raw: RawHandle) -> Option<Area> {
        self.read(raw, |record| record.size)
    }

    fn query_format(&self, raw: RawHandle) -> Option<PixelFormat> {
        self.read(raw, |record| record.format)
    }

    fn query_access_mode(&self, raw: RawHandle) -> Option<TextureAccess> {
        self.read(raw, |record| record.access)
    }

    fn query_alpha(&self, raw: RawHandle) -> Option<u8> {
        self.read(raw, |record| record.alpha)
    }

    fn query_blend_mode(&self, raw: RawHandle) -> Option<BlendMode> {
        self.read(raw, |record| record.blend_mode)
    }

    fn query_color_modulation(&self, raw: RawHandle) -> Option<Color> {
        self.read(raw, |record| record.color)
    }

    fn set_alpha(&self, raw: RawHandle, alpha: u8) -> bool {
        self.write(raw, |record| record.alpha = alpha)
    }

    fn set_blend_mode(&self, raw: RawHandle, mode: BlendMode) -> bool {
        self.write(raw, |record| record.blend_mode = mode)
    }

    fn set_color_modulation(&self, raw: RawHandle, color: Color) -> bool {
        self.write(raw, |record| record.color = color)
    }

    fn query_point_size(&self, raw: RawHandle) -> Option<u32> {
        self.read(raw, |record| record.point_size)
    }

    fn query_volume(&self, raw: RawHandle) -> Option<u8> {
        self.read(raw, |record| record.volume)
    }

    fn set_volume(&self, raw: RawHandle, volume: u8) -> bool {
        self.write(raw, |record| record.volume = volume)
    }

    fn play(&self, raw: RawHandle, _loops: i32) -> bool {
        self.write(raw, |record| {
            record.playing = true;
            record.fading = false;
        })
    }

    fn stop(&self, raw: RawHandle) -> bool {
        self.write(raw, |record| {
            record.playing = false;
            record.fading = false;
        })
    }

    fn fade_in(&self, raw: RawHandle, _duration: Duration) -> bool {
        self.write(raw, |record| {
            record.playing = true;
            record.fading = true;
        })
    }

    fn fade_out(&self, raw: RawHandle, _duration: Duration) -> bool {
        self.write(raw, |record| record.fading = true)
    }

    fn is_playing(&self, raw: RawHandle) -> bool {
        self.read(raw, |record| record.playing).unwrap_or(false)
    }

    fn is_fading(&self, raw: RawHandle) -> bool {
        self.read(raw, |record| record.fading).unwrap_or(false)
    }

    fn query_title(&self, raw: RawHandle) -> Option<String> {
        self.read(raw, |record| record.title.clone())
    }

    fn set_title(&self, raw: RawHandle, title: &str) -> bool {
        self.write(raw, |record| record.title = title.to_owned())
    }

    fn set_dimensions(&self, raw: RawHandle, size: Area) -> bool {
        !size.is_empty() && self.write(raw, |record| record.size = size)
    }
}
