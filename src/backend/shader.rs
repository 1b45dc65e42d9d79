// Shader module loading and management
//
// Vulkan uses SPIR-V bytecode for shaders. Binaries are read from disk at
// pipeline build time and the modules dropped right after.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use ash::vk;

use super::VulkanDevice;
use crate::error::{RenderError, RenderResult};

/// Read a SPIR-V binary into 32-bit words.
///
/// Fails on a missing file as well as on a size that is not a multiple of 4.
pub fn load_spirv(path: &Path) -> RenderResult<Vec<u32>> {
    let shader_error = |source: std::io::Error| RenderError::ShaderLoad {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(shader_error)?;
    ash::util::read_spv(&mut BufReader::new(file)).map_err(shader_error)
}

/// Transient shader module, destroyed on drop
pub struct ShaderModule {
    pub module: vk::ShaderModule,
    device: Arc<VulkanDevice>,
}

impl ShaderModule {
    pub fn from_file(device: Arc<VulkanDevice>, path: &Path) -> RenderResult<Self> {
        let code = load_spirv(path)?;
        let create_info = vk::ShaderModuleCreateInfo::default().code(&code);

        let module = unsafe { device.device.create_shader_module(&create_info, None) }?;
        log::debug!("Loaded shader {:?} ({} words)", path, code.len());

        Ok(Self { module, device })
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_shader_module(self.module, None);
        }
    }
}
