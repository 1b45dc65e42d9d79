// Vulkan Device - Core GPU interface
//
// Responsibilities:
// - Instance creation with optional validation layers
// - Surface creation for the target window
// - Physical device selection (first device that satisfies every requirement)
// - Logical device + graphics/present queue creation
// - Memory allocator setup

use std::ffi::{c_char, CStr, CString};
use std::mem::ManuallyDrop;
use std::sync::Arc;

use ash::{ext::debug_utils, khr, vk, Entry};
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, Allocator, AllocatorCreateDesc};
use parking_lot::Mutex;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::error::{RenderError, RenderResult};

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Device extensions every candidate GPU must expose.
pub const REQUIRED_DEVICE_EXTENSIONS: [&CStr; 1] = [khr::swapchain::NAME];

/// Queue family search result. Either index may be missing on a given GPU.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    pub fn resolve(self) -> Option<QueueFamilies> {
        Some(QueueFamilies {
            graphics: self.graphics?,
            present: self.present?,
        })
    }
}

/// Resolved queue families of the selected device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilies {
    /// Distinct family indices, graphics first.
    pub fn unique(&self) -> Vec<u32> {
        if self.graphics == self.present {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }

    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }
}

/// Find the first graphics family and the first family that can present.
pub fn find_queue_families(
    families: &[vk::QueueFamilyProperties],
    mut supports_present: impl FnMut(u32) -> bool,
) -> QueueFamilyIndices {
    let mut indices = QueueFamilyIndices::default();

    for (i, family) in families.iter().enumerate() {
        let index = i as u32;

        if indices.graphics.is_none() && family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            indices.graphics = Some(index);
        }
        if indices.present.is_none() && supports_present(index) {
            indices.present = Some(index);
        }
        if indices.is_complete() {
            break;
        }
    }

    indices
}

/// Names from `required` that do not appear in `available`.
pub fn missing_extensions<'a>(required: &[&'a CStr], available: &[&CStr]) -> Vec<&'a CStr> {
    required
        .iter()
        .copied()
        .filter(|name| !available.contains(name))
        .collect()
}

/// Why a physical device was accepted or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suitability {
    Suitable(QueueFamilies),
    MissingExtensions(Vec<String>),
    Unsuitable,
}

/// First-match device selection. No ranking among suitable devices.
///
/// When nothing qualifies, a device that failed only on extensions is
/// reported as [`RenderError::ExtensionMissing`].
pub fn pick_first_suitable<T>(
    candidates: impl IntoIterator<Item = (T, Suitability)>,
) -> RenderResult<(T, QueueFamilies)> {
    let mut missing = None;

    for (candidate, suitability) in candidates {
        match suitability {
            Suitability::Suitable(families) => return Ok((candidate, families)),
            Suitability::MissingExtensions(names) => {
                missing.get_or_insert(names);
            }
            Suitability::Unsuitable => {}
        }
    }

    match missing {
        Some(names) => Err(RenderError::ExtensionMissing(names.join(", "))),
        None => Err(RenderError::NoSuitableDevice),
    }
}

/// Highest sample count present in `supported`, never above `ceiling`.
pub fn max_usable_sample_count(
    supported: vk::SampleCountFlags,
    ceiling: u32,
) -> vk::SampleCountFlags {
    const ORDER: [(vk::SampleCountFlags, u32); 6] = [
        (vk::SampleCountFlags::TYPE_64, 64),
        (vk::SampleCountFlags::TYPE_32, 32),
        (vk::SampleCountFlags::TYPE_16, 16),
        (vk::SampleCountFlags::TYPE_8, 8),
        (vk::SampleCountFlags::TYPE_4, 4),
        (vk::SampleCountFlags::TYPE_2, 2),
    ];

    ORDER
        .iter()
        .find(|(flag, count)| *count <= ceiling && supported.contains(*flag))
        .map(|(flag, _)| *flag)
        .unwrap_or(vk::SampleCountFlags::TYPE_1)
}

/// Whether `name` is among the enumerated layers.
pub fn has_layer(layers: &[vk::LayerProperties], name: &CStr) -> bool {
    layers.iter().any(|layer| {
        let layer_name = unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) };
        layer_name == name
    })
}

/// Teardown steps for a partially built device. Runs newest first on drop
/// unless committed.
#[derive(Default)]
struct Rollback {
    steps: Vec<Box<dyn FnOnce()>>,
}

impl Rollback {
    fn push(&mut self, step: impl FnOnce() + 'static) {
        self.steps.push(Box::new(step));
    }

    /// Ownership passed on, nothing to undo
    fn commit(mut self) {
        self.steps.clear();
    }
}

impl Drop for Rollback {
    fn drop(&mut self) {
        while let Some(step) = self.steps.pop() {
            step();
        }
    }
}

/// Surface capabilities snapshot used by device selection and swapchain creation
pub struct SurfaceSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

/// Vulkan device wrapper with automatic cleanup
pub struct VulkanDevice {
    // Must go before the device, see Drop
    allocator: ManuallyDrop<Mutex<Allocator>>,

    pub device: ash::Device,
    pub physical_device: vk::PhysicalDevice,
    pub surface: vk::SurfaceKHR,
    pub surface_loader: khr::surface::Instance,
    pub instance: ash::Instance,
    _entry: Entry,

    // Queue handles
    pub queue_families: QueueFamilies,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,

    // Debug utils (if validation enabled)
    debug_utils: Option<(debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,

    // Device properties (cached)
    pub properties: vk::PhysicalDeviceProperties,
}

impl VulkanDevice {
    /// Create the Vulkan device for a window.
    ///
    /// # Arguments
    /// * `window` - Window the surface is created for
    /// * `app_name` - Application name for debugging
    /// * `enable_validation` - Enable Vulkan validation layers (debug only)
    pub fn new<W>(window: &W, app_name: &str, enable_validation: bool) -> RenderResult<Arc<Self>>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        log::info!("Creating Vulkan device: {}", app_name);

        let display_handle = window.display_handle()?.as_raw();
        let window_handle = window.window_handle()?.as_raw();

        // Step 1: Load Vulkan library
        let entry = unsafe { Entry::load() }?;

        // Step 2: Create instance
        if enable_validation {
            Self::check_validation_layer_support(&entry)?;
        }
        let surface_extensions = ash_window::enumerate_required_extensions(display_handle)?;
        let instance =
            Self::create_instance(&entry, app_name, surface_extensions, enable_validation)?;

        // Anything created from here on is destroyed again if a later step fails
        let mut rollback = Rollback::default();
        let owned = instance.clone();
        rollback.push(move || unsafe { owned.destroy_instance(None) });

        // Step 3: Setup debug messenger if validation enabled
        let debug_utils = if enable_validation {
            let (loader, messenger) = Self::setup_debug_messenger(&entry, &instance)?;
            let owned = loader.clone();
            rollback.push(move || unsafe { owned.destroy_debug_utils_messenger(messenger, None) });
            Some((loader, messenger))
        } else {
            None
        };

        // Step 4: Create surface
        let surface_loader = khr::surface::Instance::new(&entry, &instance);
        let surface = unsafe {
            ash_window::create_surface(&entry, &instance, display_handle, window_handle, None)
        }?;
        let owned = surface_loader.clone();
        rollback.push(move || unsafe { owned.destroy_surface(surface, None) });

        // Step 5: Pick physical device (GPU)
        let (physical_device, queue_families) =
            Self::pick_physical_device(&instance, &surface_loader, surface)?;

        // Step 6: Create logical device
        let device = Self::create_logical_device(&instance, physical_device, queue_families)?;
        let owned = device.clone();
        rollback.push(move || unsafe { owned.destroy_device(None) });
        let graphics_queue = unsafe { device.get_device_queue(queue_families.graphics, 0) };
        let present_queue = unsafe { device.get_device_queue(queue_families.present, 0) };

        // Step 7: Cache device properties
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };

        log::info!(
            "Selected GPU: {}",
            unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }.to_string_lossy()
        );
        log::info!(
            "API Version: {}.{}.{}",
            vk::api_version_major(properties.api_version),
            vk::api_version_minor(properties.api_version),
            vk::api_version_patch(properties.api_version)
        );
        log::debug!(
            "Queue families: graphics={} present={}",
            queue_families.graphics,
            queue_families.present
        );

        // Step 8: Create memory allocator
        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })?;

        rollback.commit();

        Ok(Arc::new(Self {
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            device,
            physical_device,
            surface,
            surface_loader,
            instance,
            _entry: entry,
            queue_families,
            graphics_queue,
            present_queue,
            debug_utils,
            properties,
        }))
    }

    fn check_validation_layer_support(entry: &Entry) -> RenderResult<()> {
        let layers = unsafe { entry.enumerate_instance_layer_properties() }?;

        if has_layer(&layers, VALIDATION_LAYER) {
            Ok(())
        } else {
            Err(RenderError::ValidationLayerMissing(
                VALIDATION_LAYER.to_string_lossy().into_owned(),
            ))
        }
    }

    fn create_instance(
        entry: &Entry,
        app_name: &str,
        surface_extensions: &[*const c_char],
        enable_validation: bool,
    ) -> RenderResult<ash::Instance> {
        let app_name_cstr = CString::new(app_name).unwrap_or_else(|_| c"renderer".to_owned());
        let engine_name = c"No Engine";

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name_cstr)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(engine_name)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_0);

        let mut extensions = surface_extensions.to_vec();
        if enable_validation {
            extensions.push(debug_utils::NAME.as_ptr());
        }

        let layer_names = if enable_validation {
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            vec![]
        };

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names);

        let instance = unsafe { entry.create_instance(&create_info, None) }?;
        Ok(instance)
    }

    fn setup_debug_messenger(
        entry: &Entry,
        instance: &ash::Instance,
    ) -> RenderResult<(debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
        let loader = debug_utils::Instance::new(entry, instance);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe { loader.create_debug_utils_messenger(&create_info, None) }?;

        Ok((loader, messenger))
    }

    fn pick_physical_device(
        instance: &ash::Instance,
        surface_loader: &khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> RenderResult<(vk::PhysicalDevice, QueueFamilies)> {
        let devices = unsafe { instance.enumerate_physical_devices() }?;
        log::debug!("Found {} physical device(s)", devices.len());

        let mut candidates = Vec::with_capacity(devices.len());
        for device in devices {
            let suitability = Self::evaluate_device(instance, surface_loader, surface, device)?;
            candidates.push((device, suitability));
        }

        pick_first_suitable(candidates)
    }

    fn evaluate_device(
        instance: &ash::Instance,
        surface_loader: &khr::surface::Instance,
        surface: vk::SurfaceKHR,
        device: vk::PhysicalDevice,
    ) -> RenderResult<Suitability> {
        // (a) + (b): graphics and present families
        let families = unsafe { instance.get_physical_device_queue_family_properties(device) };
        let indices = find_queue_families(&families, |index| unsafe {
            surface_loader
                .get_physical_device_surface_support(device, index, surface)
                .unwrap_or(false)
        });
        let Some(queue_families) = indices.resolve() else {
            return Ok(Suitability::Unsuitable);
        };

        // (c): required extensions
        let available = unsafe { instance.enumerate_device_extension_properties(device) }?;
        let available_names: Vec<&CStr> = available
            .iter()
            .map(|ext| unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) })
            .collect();
        let missing = missing_extensions(&REQUIRED_DEVICE_EXTENSIONS, &available_names);
        if !missing.is_empty() {
            return Ok(Suitability::MissingExtensions(
                missing
                    .iter()
                    .map(|name| name.to_string_lossy().into_owned())
                    .collect(),
            ));
        }

        // (d): at least one surface format and present mode
        let support = query_surface_support(surface_loader, device, surface)?;
        if support.formats.is_empty() || support.present_modes.is_empty() {
            return Ok(Suitability::Unsuitable);
        }

        Ok(Suitability::Suitable(queue_families))
    }

    fn create_logical_device(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        queue_families: QueueFamilies,
    ) -> RenderResult<ash::Device> {
        let queue_priorities = [1.0];
        let queue_create_infos: Vec<_> = queue_families
            .unique()
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family)
                    .queue_priorities(&queue_priorities)
            })
            .collect();

        let extensions: Vec<*const c_char> =
            REQUIRED_DEVICE_EXTENSIONS.iter().map(|name| name.as_ptr()).collect();

        let features = vk::PhysicalDeviceFeatures::default()
            .sampler_anisotropy(true)
            .sample_rate_shading(true);

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&extensions)
            .enabled_features(&features);

        let device = unsafe { instance.create_device(physical_device, &create_info, None) }?;
        Ok(device)
    }

    /// Re-query surface capabilities, e.g. before (re)creating a swapchain
    pub fn surface_support(&self) -> RenderResult<SurfaceSupport> {
        query_surface_support(&self.surface_loader, self.physical_device, self.surface)
    }

    pub fn format_properties(&self, format: vk::Format) -> vk::FormatProperties {
        unsafe {
            self.instance
                .get_physical_device_format_properties(self.physical_device, format)
        }
    }

    /// Sample count for render targets: device maximum bounded by `ceiling`,
    /// or a single sample when multisampling is off.
    pub fn sample_count(&self, msaa: bool, ceiling: u32) -> vk::SampleCountFlags {
        if !msaa {
            return vk::SampleCountFlags::TYPE_1;
        }
        let limits = &self.properties.limits;
        max_usable_sample_count(
            limits.framebuffer_color_sample_counts & limits.framebuffer_depth_sample_counts,
            ceiling,
        )
    }

    pub fn max_sampler_anisotropy(&self) -> f32 {
        self.properties.limits.max_sampler_anisotropy
    }

    pub fn allocate(&self, desc: &AllocationCreateDesc) -> RenderResult<Allocation> {
        Ok(self.allocator.lock().allocate(desc)?)
    }

    /// Return an allocation to the allocator. Failures are logged, not raised,
    /// since this runs from `Drop` impls.
    pub fn free(&self, allocation: Allocation) {
        if let Err(e) = self.allocator.lock().free(allocation) {
            log::error!("Failed to free GPU allocation: {}", e);
        }
    }

    /// Wait for device to be idle (e.g., before cleanup or swapchain rebuild)
    pub fn wait_idle(&self) -> RenderResult<()> {
        unsafe { self.device.device_wait_idle() }?;
        Ok(())
    }
}

fn query_surface_support(
    surface_loader: &khr::surface::Instance,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> RenderResult<SurfaceSupport> {
    unsafe {
        Ok(SurfaceSupport {
            capabilities: surface_loader.get_physical_device_surface_capabilities(device, surface)?,
            formats: surface_loader.get_physical_device_surface_formats(device, surface)?,
            present_modes: surface_loader
                .get_physical_device_surface_present_modes(device, surface)?,
        })
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan device...");

        let _ = self.wait_idle();

        // Cleanup in reverse order; the allocator frees its blocks through
        // the device, so it goes first.
        unsafe {
            ManuallyDrop::drop(&mut self.allocator);

            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);

            if let Some((loader, messenger)) = self.debug_utils.take() {
                loader.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*p_callback_data).p_message);

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("[Vulkan] {}", message.to_string_lossy());
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("[Vulkan] {}", message.to_string_lossy());
        }
        _ => {
            log::debug!("[Vulkan] {}", message.to_string_lossy());
        }
    }

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn layer(name: &CStr) -> vk::LayerProperties {
        let mut layer = vk::LayerProperties::default();
        for (dst, &src) in layer.layer_name.iter_mut().zip(name.to_bytes_with_nul()) {
            *dst = src as c_char;
        }
        layer
    }

    #[test]
    fn test_has_layer() {
        let layers = [layer(c"VK_LAYER_MESA_overlay"), layer(VALIDATION_LAYER)];
        assert!(has_layer(&layers, VALIDATION_LAYER));
        assert!(!has_layer(&layers[..1], VALIDATION_LAYER));
        assert!(!has_layer(&[], VALIDATION_LAYER));
    }

    #[test]
    fn test_rollback_undoes_newest_first() {
        let undone = Rc::new(RefCell::new(Vec::new()));
        {
            let mut rollback = Rollback::default();
            for step in ["instance", "messenger", "surface"] {
                let undone = Rc::clone(&undone);
                rollback.push(move || undone.borrow_mut().push(step));
            }
            // Dropped without commit, as on an early `?` return
        }
        assert_eq!(*undone.borrow(), vec!["surface", "messenger", "instance"]);
    }

    #[test]
    fn test_rollback_commit_keeps_everything() {
        let undone = Rc::new(RefCell::new(0));
        let mut rollback = Rollback::default();
        let counter = Rc::clone(&undone);
        rollback.push(move || *counter.borrow_mut() += 1);
        rollback.commit();
        assert_eq!(*undone.borrow(), 0);
    }

    fn family(flags: vk::QueueFlags) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_queue_families_same_family() {
        let families = [family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE)];
        let indices = find_queue_families(&families, |_| true);
        assert_eq!(indices.resolve(), Some(QueueFamilies { graphics: 0, present: 0 }));
        assert!(indices.resolve().map(|f| f.is_shared()).unwrap_or(false));
    }

    #[test]
    fn test_queue_families_split() {
        let families = [
            family(vk::QueueFlags::TRANSFER),
            family(vk::QueueFlags::GRAPHICS),
            family(vk::QueueFlags::COMPUTE),
        ];
        let indices = find_queue_families(&families, |i| i == 2);
        let resolved = indices.resolve().unwrap();
        assert_eq!(resolved.graphics, 1);
        assert_eq!(resolved.present, 2);
        assert_eq!(resolved.unique(), vec![1, 2]);
    }

    #[test]
    fn test_queue_families_no_present() {
        let families = [family(vk::QueueFlags::GRAPHICS)];
        let indices = find_queue_families(&families, |_| false);
        assert!(!indices.is_complete());
        assert_eq!(indices.resolve(), None);
    }

    #[test]
    fn test_missing_extensions() {
        let available = [c"VK_KHR_maintenance1", c"VK_KHR_swapchain"];
        assert!(missing_extensions(&REQUIRED_DEVICE_EXTENSIONS, &available).is_empty());

        let available = [c"VK_KHR_maintenance1"];
        assert_eq!(
            missing_extensions(&REQUIRED_DEVICE_EXTENSIONS, &available),
            vec![c"VK_KHR_swapchain"]
        );
    }

    #[test]
    fn test_pick_first_suitable_takes_first_match() {
        let a = QueueFamilies { graphics: 0, present: 0 };
        let b = QueueFamilies { graphics: 1, present: 2 };
        let picked = pick_first_suitable(vec![
            ("cpu", Suitability::Unsuitable),
            ("integrated", Suitability::Suitable(a)),
            ("discrete", Suitability::Suitable(b)),
        ])
        .unwrap();
        assert_eq!(picked, ("integrated", a));
    }

    #[test]
    fn test_pick_first_suitable_reports_extension() {
        let result = pick_first_suitable(vec![
            (0, Suitability::Unsuitable),
            (1, Suitability::MissingExtensions(vec!["VK_KHR_swapchain".into()])),
        ]);
        match result {
            Err(RenderError::ExtensionMissing(name)) => assert_eq!(name, "VK_KHR_swapchain"),
            other => panic!("unexpected result: {:?}", other.map(|(i, _)| i)),
        }
    }

    #[test]
    fn test_pick_first_suitable_none() {
        let result = pick_first_suitable::<u32>(vec![(0, Suitability::Unsuitable)]);
        assert!(matches!(result, Err(RenderError::NoSuitableDevice)));
        let result = pick_first_suitable::<u32>(Vec::new());
        assert!(matches!(result, Err(RenderError::NoSuitableDevice)));
    }

    #[test]
    fn test_max_usable_sample_count() {
        let supported = vk::SampleCountFlags::TYPE_1
            | vk::SampleCountFlags::TYPE_2
            | vk::SampleCountFlags::TYPE_4
            | vk::SampleCountFlags::TYPE_8;
        assert_eq!(max_usable_sample_count(supported, 64), vk::SampleCountFlags::TYPE_8);
        assert_eq!(max_usable_sample_count(supported, 4), vk::SampleCountFlags::TYPE_4);
        assert_eq!(max_usable_sample_count(supported, 1), vk::SampleCountFlags::TYPE_1);
        assert_eq!(
            max_usable_sample_count(vk::SampleCountFlags::TYPE_1, 8),
            vk::SampleCountFlags::TYPE_1
        );
    }
}
