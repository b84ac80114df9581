//! Shader/buffer backend
//!
//! Resources are created once at initialization and held by
//! [`GpuResources`]; each frame rebuilds the vertex array, uploads it into
//! the dynamic vertex buffer and issues one draw per channel.
//!
//! The graphics API is reached through [`GpuDevice`] (resource creation)
//! and [`GpuContext`] (per-frame commands). Owned objects release
//! themselves on drop, so a failed initialization leaves nothing behind.

use super::InitError;
use crate::vertex::{Frame, Vertex, FRAME_VERTICES, VERTICES_PER_CHANNEL};
use crate::viewport::Viewport;

/// Component format of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    Float3,
    Float4,
}

/// One vertex attribute as the input layout describes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: &'static std::ffi::CStr,
    pub format: AttributeFormat,
    pub byte_offset: u32,
}

/// Input layout matching [`Vertex`]
pub const VERTEX_LAYOUT: [VertexAttribute; 2] = [
    VertexAttribute {
        semantic: c"POSITION",
        format: AttributeFormat::Float3,
        byte_offset: 0,
    },
    VertexAttribute {
        semantic: c"COLOR",
        format: AttributeFormat::Float4,
        byte_offset: 12,
    },
];

/// Vertex buffer capacity in bytes
pub const VERTEX_BUFFER_BYTES: u32 = (FRAME_VERTICES * std::mem::size_of::<Vertex>()) as u32;

/// Precompiled shader programs, embedded in the binary
#[derive(Debug, Clone, Copy)]
pub struct ShaderBytecode {
    pub vertex: &'static [u8],
    pub pixel: &'static [u8],
}

/// Creates the objects the backend owns. Errors carry the driver message.
pub trait GpuDevice {
    type VertexShader;
    type PixelShader;
    type InputLayout;
    type Buffer;

    fn create_vertex_shader(&self, bytecode: &[u8]) -> Result<Self::VertexShader, String>;

    fn create_input_layout(
        &self,
        layout: &[VertexAttribute],
        vertex_bytecode: &[u8],
    ) -> Result<Self::InputLayout, String>;

    fn create_pixel_shader(&self, bytecode: &[u8]) -> Result<Self::PixelShader, String>;

    /// CPU-writable buffer bound as vertex input
    fn create_dynamic_vertex_buffer(&self, byte_width: u32) -> Result<Self::Buffer, String>;

    /// GPU-only constant buffer initialized with `contents`
    fn create_constant_buffer(&self, contents: &[u8]) -> Result<Self::Buffer, String>;
}

/// Per-frame command submission
pub trait GpuContext {
    type Device: GpuDevice;

    fn device(&self) -> &Self::Device;

    /// Bind vertex buffer, input layout, line-strip topology, shaders and
    /// constant buffer
    fn bind(&self, resources: &GpuResources<Self::Device>);

    /// Replace the buffer contents (write-discard map, copy, unmap)
    fn upload(
        &self,
        buffer: &<Self::Device as GpuDevice>::Buffer,
        bytes: &[u8],
    ) -> Result<(), String>;

    fn draw(&self, vertex_count: u32, start_vertex: u32);
}

/// Everything the backend creates and exclusively owns.
///
/// Field order is release order.
pub struct GpuResources<D: GpuDevice> {
    constant_buffer: D::Buffer,
    vertex_buffer: D::Buffer,
    input_layout: D::InputLayout,
    vertex_shader: D::VertexShader,
    pixel_shader: D::PixelShader,
}

impl<D: GpuDevice> GpuResources<D> {
    /// Create all resources in order. On the first failure the objects made
    /// so far are dropped and the step's error is returned.
    pub fn create(
        device: &D,
        shaders: &ShaderBytecode,
        viewport: &Viewport,
    ) -> Result<Self, InitError> {
        let vertex_shader = device
            .create_vertex_shader(shaders.vertex)
            .map_err(InitError::VertexShader)?;

        let input_layout = device
            .create_input_layout(&VERTEX_LAYOUT, shaders.vertex)
            .map_err(InitError::InputLayout)?;

        let pixel_shader = device
            .create_pixel_shader(shaders.pixel)
            .map_err(InitError::PixelShader)?;

        let vertex_buffer = device
            .create_dynamic_vertex_buffer(VERTEX_BUFFER_BYTES)
            .map_err(InitError::VertexBuffer)?;

        let constants = viewport.constants();
        let constant_buffer = device
            .create_constant_buffer(bytemuck::bytes_of(&constants))
            .map_err(InitError::ConstantBuffer)?;

        Ok(Self {
            constant_buffer,
            vertex_buffer,
            input_layout,
            vertex_shader,
            pixel_shader,
        })
    }

    pub fn constant_buffer(&self) -> &D::Buffer {
        &self.constant_buffer
    }

    pub fn vertex_buffer(&self) -> &D::Buffer {
        &self.vertex_buffer
    }

    pub fn input_layout(&self) -> &D::InputLayout {
        &self.input_layout
    }

    pub fn vertex_shader(&self) -> &D::VertexShader {
        &self.vertex_shader
    }

    pub fn pixel_shader(&self) -> &D::PixelShader {
        &self.pixel_shader
    }
}

/// Renderer over any [`GpuContext`]
pub struct GpuRenderer<C: GpuContext> {
    // Owned resources go before the context so they are released first
    resources: GpuResources<C::Device>,
    context: C,
}

impl<C: GpuContext> GpuRenderer<C> {
    pub fn new(
        context: C,
        shaders: &ShaderBytecode,
        viewport: &Viewport,
    ) -> Result<Self, InitError> {
        let resources = GpuResources::create(context.device(), shaders, viewport)?;
        Ok(Self { resources, context })
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn resources(&self) -> &GpuResources<C::Device> {
        &self.resources
    }

    /// Upload the whole frame, then draw the left and right strips
    pub fn draw(&mut self, frame: &Frame) {
        self.context.bind(&self.resources);

        if let Err(e) = self
            .context
            .upload(self.resources.vertex_buffer(), frame.as_bytes())
        {
            log::warn!("Failed to upload waveform vertices: {}", e);
        }

        let per_channel = VERTICES_PER_CHANNEL as u32;
        self.context.draw(per_channel, 0);
        self.context.draw(per_channel, per_channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::build_frame;
    use crate::waveform::WaveformBuffer;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Creation steps in the order they run
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        VertexShader,
        InputLayout,
        PixelShader,
        VertexBuffer,
        ConstantBuffer,
    }

    /// Mock GPU object that tracks how many are alive
    #[derive(Debug)]
    struct MockObject {
        kind: Step,
        contents: Vec<u8>,
        byte_width: u32,
        live: Rc<Cell<i32>>,
        released: Rc<RefCell<Vec<Step>>>,
    }

    impl Drop for MockObject {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
            self.released.borrow_mut().push(self.kind);
        }
    }

    #[derive(Default)]
    struct MockDevice {
        fail_at: Option<Step>,
        live: Rc<Cell<i32>>,
        released: Rc<RefCell<Vec<Step>>>,
        layout: RefCell<Vec<VertexAttribute>>,
    }

    impl MockDevice {
        fn failing_at(step: Step) -> Self {
            Self {
                fail_at: Some(step),
                ..Default::default()
            }
        }

        fn make(&self, kind: Step, contents: &[u8], byte_width: u32) -> Result<MockObject, String> {
            if self.fail_at == Some(kind) {
                return Err("E_OUTOFMEMORY".to_string());
            }
            self.live.set(self.live.get() + 1);
            Ok(MockObject {
                kind,
                contents: contents.to_vec(),
                byte_width,
                live: self.live.clone(),
                released: self.released.clone(),
            })
        }
    }

    impl GpuDevice for MockDevice {
        type VertexShader = MockObject;
        type PixelShader = MockObject;
        type InputLayout = MockObject;
        type Buffer = MockObject;

        fn create_vertex_shader(&self, bytecode: &[u8]) -> Result<MockObject, String> {
            self.make(Step::VertexShader, bytecode, 0)
        }

        fn create_input_layout(
            &self,
            layout: &[VertexAttribute],
            vertex_bytecode: &[u8],
        ) -> Result<MockObject, String> {
            *self.layout.borrow_mut() = layout.to_vec();
            self.make(Step::InputLayout, vertex_bytecode, 0)
        }

        fn create_pixel_shader(&self, bytecode: &[u8]) -> Result<MockObject, String> {
            self.make(Step::PixelShader, bytecode, 0)
        }

        fn create_dynamic_vertex_buffer(&self, byte_width: u32) -> Result<MockObject, String> {
            self.make(Step::VertexBuffer, &[], byte_width)
        }

        fn create_constant_buffer(&self, contents: &[u8]) -> Result<MockObject, String> {
            self.make(Step::ConstantBuffer, contents, contents.len() as u32)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Command {
        Bind,
        Upload(usize),
        Draw(u32, u32),
    }

    #[derive(Default)]
    struct MockContext {
        device: MockDevice,
        fail_upload: bool,
        commands: RefCell<Vec<Command>>,
        uploads: RefCell<Vec<Vec<u8>>>,
    }

    impl GpuContext for MockContext {
        type Device = MockDevice;

        fn device(&self) -> &MockDevice {
            &self.device
        }

        fn bind(&self, resources: &GpuResources<MockDevice>) {
            assert_eq!(resources.vertex_buffer().kind, Step::VertexBuffer);
            assert_eq!(resources.constant_buffer().kind, Step::ConstantBuffer);
            self.commands.borrow_mut().push(Command::Bind);
        }

        fn upload(&self, buffer: &MockObject, bytes: &[u8]) -> Result<(), String> {
            if self.fail_upload {
                return Err("DXGI_ERROR_DEVICE_REMOVED".to_string());
            }
            assert!(bytes.len() <= buffer.byte_width as usize);
            self.commands.borrow_mut().push(Command::Upload(bytes.len()));
            self.uploads.borrow_mut().push(bytes.to_vec());
            Ok(())
        }

        fn draw(&self, vertex_count: u32, start_vertex: u32) {
            self.commands
                .borrow_mut()
                .push(Command::Draw(vertex_count, start_vertex));
        }
    }

    fn shaders() -> ShaderBytecode {
        ShaderBytecode {
            vertex: &[0xD8, 0x0B, 0x01],
            pixel: &[0xD8, 0x0B, 0x02],
        }
    }

    #[test]
    fn creates_all_five_resources() {
        let device = MockDevice::default();

        let resources = GpuResources::create(&device, &shaders(), &Viewport::default()).unwrap();

        assert_eq!(device.live.get(), 5);
        assert_eq!(resources.vertex_shader().contents, shaders().vertex);
        assert_eq!(resources.input_layout().contents, shaders().vertex);
        assert_eq!(resources.pixel_shader().contents, shaders().pixel);
        assert_eq!(resources.vertex_buffer().byte_width, 512 * 28);
    }

    #[test]
    fn input_layout_matches_vertex_struct() {
        let device = MockDevice::default();

        let _resources = GpuResources::create(&device, &shaders(), &Viewport::default()).unwrap();

        let layout = device.layout.borrow();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].semantic, c"POSITION");
        assert_eq!(layout[0].format, AttributeFormat::Float3);
        assert_eq!(layout[1].semantic, c"COLOR");
        assert_eq!(layout[1].format, AttributeFormat::Float4);
        assert_eq!(
            layout[1].byte_offset as usize,
            std::mem::offset_of!(Vertex, color)
        );
    }

    #[test]
    fn constant_buffer_holds_viewport_size() {
        let device = MockDevice::default();

        let resources = GpuResources::create(&device, &shaders(), &Viewport::default()).unwrap();

        let floats: Vec<f32> = resources
            .constant_buffer()
            .contents
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(floats, vec![2.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn any_failed_step_aborts_without_leaking() {
        let steps = [
            Step::VertexShader,
            Step::InputLayout,
            Step::PixelShader,
            Step::VertexBuffer,
            Step::ConstantBuffer,
        ];

        for step in steps {
            let device = MockDevice::failing_at(step);

            let result = GpuResources::create(&device, &shaders(), &Viewport::default());

            let err = result.err().expect("creation should fail");
            let matches_step = match step {
                Step::VertexShader => matches!(err, InitError::VertexShader(_)),
                Step::InputLayout => matches!(err, InitError::InputLayout(_)),
                Step::PixelShader => matches!(err, InitError::PixelShader(_)),
                Step::VertexBuffer => matches!(err, InitError::VertexBuffer(_)),
                Step::ConstantBuffer => matches!(err, InitError::ConstantBuffer(_)),
            };
            assert!(matches_step, "{:?} failed with {:?}", step, err);
            assert_eq!(device.live.get(), 0, "leak after failing at {:?}", step);
        }
    }

    #[test]
    fn dropping_resources_releases_in_fixed_order() {
        let device = MockDevice::default();
        let resources = GpuResources::create(&device, &shaders(), &Viewport::default()).unwrap();

        drop(resources);

        assert_eq!(device.live.get(), 0);
        assert_eq!(
            *device.released.borrow(),
            vec![
                Step::ConstantBuffer,
                Step::VertexBuffer,
                Step::InputLayout,
                Step::VertexShader,
                Step::PixelShader,
            ]
        );
    }

    #[test]
    fn renderer_uploads_frame_and_draws_each_channel() {
        let mut waveform = WaveformBuffer::new();
        waveform.deinterleave(&[0.5, -0.5]);
        let frame = build_frame(&waveform, &Viewport::default());
        let mut renderer =
            GpuRenderer::new(MockContext::default(), &shaders(), &Viewport::default()).unwrap();

        renderer.draw(&frame);

        assert_eq!(
            *renderer.context().commands.borrow(),
            vec![
                Command::Bind,
                Command::Upload(512 * 28),
                Command::Draw(256, 0),
                Command::Draw(256, 256),
            ]
        );
        assert_eq!(renderer.context().uploads.borrow()[0], frame.as_bytes());
    }

    #[test]
    fn failed_upload_still_draws() {
        let frame = build_frame(&WaveformBuffer::new(), &Viewport::default());
        let context = MockContext {
            fail_upload: true,
            ..Default::default()
        };
        let mut renderer = GpuRenderer::new(context, &shaders(), &Viewport::default()).unwrap();

        renderer.draw(&frame);

        assert_eq!(
            *renderer.context().commands.borrow(),
            vec![Command::Bind, Command::Draw(256, 0), Command::Draw(256, 256)]
        );
    }

    #[test]
    fn rendering_twice_uploads_identical_bytes() {
        let mut waveform = WaveformBuffer::new();
        waveform.deinterleave(&[0.1, 0.2, 0.3, 0.4]);
        let mut renderer =
            GpuRenderer::new(MockContext::default(), &shaders(), &Viewport::default()).unwrap();

        renderer.draw(&build_frame(&waveform, &Viewport::default()));
        renderer.draw(&build_frame(&waveform, &Viewport::default()));

        let uploads = renderer.context().uploads.borrow();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0], uploads[1]);
    }

    #[test]
    fn dropping_renderer_releases_everything() {
        let context = MockContext::default();
        let live = context.device.live.clone();
        let renderer = GpuRenderer::new(context, &shaders(), &Viewport::default()).unwrap();
        assert_eq!(live.get(), 5);

        drop(renderer);

        assert_eq!(live.get(), 0);
    }

    #[test]
    fn failed_renderer_construction_leaks_nothing() {
        let context = MockContext {
            device: MockDevice::failing_at(Step::ConstantBuffer),
            ..Default::default()
        };
        let live = context.device.live.clone();

        let result = GpuRenderer::new(context, &shaders(), &Viewport::default());

        assert!(matches!(result, Err(InitError::ConstantBuffer(_))));
        assert_eq!(live.get(), 0);
    }
}
