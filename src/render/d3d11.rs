//! Direct3D 11 binding for the shader/buffer backend
//!
//! The host hands out its immediate `ID3D11DeviceContext`. Initialization
//! takes one reference on it and on its device; both are dropped with the
//! renderer, after the resources created here.

use super::gpu::{
    AttributeFormat, GpuContext, GpuDevice, GpuRenderer, GpuResources, ShaderBytecode,
    VertexAttribute,
};
use super::{InitError, Renderer};
use crate::host::Host;
use crate::vertex::{Frame, Vertex};
use crate::viewport::Viewport;

use std::ffi::{c_void, CStr};

use windows::core::{Interface, PCSTR};
use windows::Win32::Graphics::Direct3D::D3D11_PRIMITIVE_TOPOLOGY_LINESTRIP;
use windows::Win32::Graphics::Direct3D11::{
    ID3D11Buffer, ID3D11Device, ID3D11DeviceContext, ID3D11InputLayout, ID3D11PixelShader,
    ID3D11VertexShader, D3D11_BIND_CONSTANT_BUFFER, D3D11_BIND_VERTEX_BUFFER, D3D11_BUFFER_DESC,
    D3D11_CPU_ACCESS_WRITE, D3D11_INPUT_ELEMENT_DESC, D3D11_INPUT_PER_VERTEX_DATA,
    D3D11_MAPPED_SUBRESOURCE, D3D11_MAP_WRITE_DISCARD, D3D11_SUBRESOURCE_DATA,
    D3D11_USAGE_DEFAULT, D3D11_USAGE_DYNAMIC,
};
use windows::Win32::Graphics::Dxgi::Common::{
    DXGI_FORMAT, DXGI_FORMAT_R32G32B32A32_FLOAT, DXGI_FORMAT_R32G32B32_FLOAT,
};

/// Waveform shaders compiled by the build script (`vs_4_0` / `ps_4_0`)
pub const WAVEFORM_SHADERS: ShaderBytecode = ShaderBytecode {
    vertex: include_bytes!(concat!(env!("OUT_DIR"), "/waveform_vs.cso")),
    pixel: include_bytes!(concat!(env!("OUT_DIR"), "/waveform_ps.cso")),
};

fn pcstr(s: &CStr) -> PCSTR {
    PCSTR::from_raw(s.as_ptr() as *const u8)
}

fn dxgi_format(format: AttributeFormat) -> DXGI_FORMAT {
    match format {
        AttributeFormat::Float3 => DXGI_FORMAT_R32G32B32_FLOAT,
        AttributeFormat::Float4 => DXGI_FORMAT_R32G32B32A32_FLOAT,
    }
}

/// Device reference taken from the host's context
pub struct D3d11Device(ID3D11Device);

impl GpuDevice for D3d11Device {
    type VertexShader = ID3D11VertexShader;
    type PixelShader = ID3D11PixelShader;
    type InputLayout = ID3D11InputLayout;
    type Buffer = ID3D11Buffer;

    fn create_vertex_shader(&self, bytecode: &[u8]) -> Result<ID3D11VertexShader, String> {
        let mut shader = None;
        unsafe { self.0.CreateVertexShader(bytecode, None, Some(&mut shader)) }
            .map_err(|e| e.to_string())?;
        shader.ok_or_else(|| "driver returned no vertex shader".to_string())
    }

    fn create_input_layout(
        &self,
        layout: &[VertexAttribute],
        vertex_bytecode: &[u8],
    ) -> Result<ID3D11InputLayout, String> {
        let elements: Vec<D3D11_INPUT_ELEMENT_DESC> = layout
            .iter()
            .map(|attribute| D3D11_INPUT_ELEMENT_DESC {
                SemanticName: pcstr(attribute.semantic),
                SemanticIndex: 0,
                Format: dxgi_format(attribute.format),
                InputSlot: 0,
                AlignedByteOffset: attribute.byte_offset,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            })
            .collect();

        let mut input_layout = None;
        unsafe {
            self.0
                .CreateInputLayout(&elements, vertex_bytecode, Some(&mut input_layout))
        }
        .map_err(|e| e.to_string())?;
        input_layout.ok_or_else(|| "driver returned no input layout".to_string())
    }

    fn create_pixel_shader(&self, bytecode: &[u8]) -> Result<ID3D11PixelShader, String> {
        let mut shader = None;
        unsafe { self.0.CreatePixelShader(bytecode, None, Some(&mut shader)) }
            .map_err(|e| e.to_string())?;
        shader.ok_or_else(|| "driver returned no pixel shader".to_string())
    }

    fn create_dynamic_vertex_buffer(&self, byte_width: u32) -> Result<ID3D11Buffer, String> {
        let desc = D3D11_BUFFER_DESC {
            ByteWidth: byte_width,
            Usage: D3D11_USAGE_DYNAMIC,
            BindFlags: D3D11_BIND_VERTEX_BUFFER.0 as u32,
            CPUAccessFlags: D3D11_CPU_ACCESS_WRITE.0 as u32,
            MiscFlags: 0,
            StructureByteStride: 0,
        };

        let mut buffer = None;
        unsafe { self.0.CreateBuffer(&desc, None, Some(&mut buffer)) }
            .map_err(|e| e.to_string())?;
        buffer.ok_or_else(|| "driver returned no vertex buffer".to_string())
    }

    fn create_constant_buffer(&self, contents: &[u8]) -> Result<ID3D11Buffer, String> {
        let desc = D3D11_BUFFER_DESC {
            ByteWidth: contents.len() as u32,
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: D3D11_BIND_CONSTANT_BUFFER.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
            StructureByteStride: 0,
        };
        let initial = D3D11_SUBRESOURCE_DATA {
            pSysMem: contents.as_ptr() as *const c_void,
            SysMemPitch: 0,
            SysMemSlicePitch: 0,
        };

        let mut buffer = None;
        unsafe { self.0.CreateBuffer(&desc, Some(&initial), Some(&mut buffer)) }
            .map_err(|e| e.to_string())?;
        buffer.ok_or_else(|| "driver returned no constant buffer".to_string())
    }
}

/// The host's immediate context plus the device it belongs to
pub struct D3d11Context {
    context: ID3D11DeviceContext,
    device: D3d11Device,
}

impl D3d11Context {
    /// Take a reference on the host's context and its device
    pub fn acquire(host: &dyn Host) -> Result<Self, InitError> {
        let raw = host.device().as_ptr();
        let context = unsafe { ID3D11DeviceContext::from_raw_borrowed(&raw) }
            .ok_or(InitError::NoDevice)?
            .clone();
        let device = unsafe { context.GetDevice() }.map_err(|_| InitError::NoDevice)?;

        Ok(Self {
            context,
            device: D3d11Device(device),
        })
    }
}

impl GpuContext for D3d11Context {
    type Device = D3d11Device;

    fn device(&self) -> &D3d11Device {
        &self.device
    }

    fn bind(&self, resources: &GpuResources<D3d11Device>) {
        let stride = std::mem::size_of::<Vertex>() as u32;
        let offset = 0u32;
        let vertex_buffers = [Some(resources.vertex_buffer().clone())];
        let constant_buffers = [Some(resources.constant_buffer().clone())];

        unsafe {
            self.context.IASetVertexBuffers(
                0,
                1,
                Some(vertex_buffers.as_ptr()),
                Some(&stride),
                Some(&offset),
            );
            self.context.IASetInputLayout(resources.input_layout());
            self.context
                .IASetPrimitiveTopology(D3D11_PRIMITIVE_TOPOLOGY_LINESTRIP);
            self.context.VSSetShader(resources.vertex_shader(), None);
            self.context.VSSetConstantBuffers(0, Some(&constant_buffers));
            self.context.PSSetShader(resources.pixel_shader(), None);
        }
    }

    fn upload(&self, buffer: &ID3D11Buffer, bytes: &[u8]) -> Result<(), String> {
        let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
        unsafe {
            self.context
                .Map(buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped))
                .map_err(|e| e.to_string())?;
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), mapped.pData as *mut u8, bytes.len());
            self.context.Unmap(buffer, 0);
        }
        Ok(())
    }

    fn draw(&self, vertex_count: u32, start_vertex: u32) {
        unsafe { self.context.Draw(vertex_count, start_vertex) };
    }
}

/// The `d3d11` feature's renderer
pub type D3d11Renderer = GpuRenderer<D3d11Context>;

impl Renderer for GpuRenderer<D3d11Context> {
    const NAME: &'static str = "Direct3D 11";

    fn initialize(host: &dyn Host, viewport: &Viewport) -> Result<Self, InitError> {
        let context = D3d11Context::acquire(host)?;
        GpuRenderer::new(context, &WAVEFORM_SHADERS, viewport)
    }

    fn render(&mut self, frame: &Frame) {
        self.draw(frame);
    }
}
