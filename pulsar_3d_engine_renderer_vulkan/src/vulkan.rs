/// VulkanDevice - Vulkan implementation of the NativeDevice operation set

use pulsar_3d_engine::pulsar3d::{Config, Error, Result};
use pulsar_3d_engine::{engine_error, engine_err, engine_info, engine_bail};
use ash::vk;
use raw_window_handle::{
    HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
};
use rustc_hash::FxHashMap;
use std::sync::Mutex;

/// Frame pacing state owned per live swap chain
///
/// One frame in flight: the fence starts signaled so the first
/// `wait_frame_fence` returns immediately.
pub(crate) struct FrameSync {
    pub(crate) image_available: vk::Semaphore,
    pub(crate) render_finished: vk::Semaphore,
    pub(crate) in_flight: vk::Fence,
}

/// Vulkan device implementation
///
/// Bound to one window at construction. Every operation takes `&self`;
/// the only mutable bookkeeping (per-swap-chain frame pacing state) sits
/// behind a Mutex. All queue work goes through the graphics queue;
/// presentation through the present queue (which may be the same).
pub struct VulkanDevice {
    /// Vulkan entry (needed for surface creation)
    pub(crate) entry: ash::Entry,
    pub(crate) instance: ash::Instance,
    pub(crate) physical_device: vk::PhysicalDevice,
    pub(crate) device: ash::Device,
    pub(crate) memory_properties: vk::PhysicalDeviceMemoryProperties,

    /// Graphics queue
    pub(crate) graphics_queue: vk::Queue,
    pub(crate) graphics_queue_family: u32,
    /// Present queue (may be same as graphics)
    pub(crate) present_queue: vk::Queue,
    pub(crate) present_queue_family: u32,

    pub(crate) surface_loader: ash::khr::surface::Instance,
    pub(crate) swapchain_loader: ash::khr::swapchain::Device,

    /// Pool for primary command buffers (frame recording and scope uploads)
    pub(crate) command_pool: vk::CommandPool,
    /// Pool for descriptor set allocation
    pub(crate) descriptor_pool: vk::DescriptorPool,
    /// Shared sampler used by every combined-image-sampler binding
    pub(crate) sampler: vk::Sampler,

    /// Debug messenger (only when validation is enabled)
    pub(crate) debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
    pub(crate) debug_messenger: Option<vk::DebugUtilsMessengerEXT>,

    /// Raw window handles kept for swap chain surface creation
    pub(crate) display_handle: RawDisplayHandle,
    pub(crate) window_handle: RawWindowHandle,

    /// Per-swap-chain frame pacing state, keyed by raw swap chain handle
    pub(crate) frame_sync: Mutex<FxHashMap<u64, FrameSync>>,
}

impl VulkanDevice {
    /// Create a new Vulkan device bound to the given window
    ///
    /// # Arguments
    ///
    /// * `window` - Window the device will present to
    /// * `config` - Renderer configuration (validation, application identity)
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        config: Config,
    ) -> Result<Self> {
        unsafe {
            // Create Vulkan Entry
            let entry = ash::Entry::load()
                .map_err(|e| {
                    engine_error!("pulsar3d::vulkan", "Failed to load Vulkan library: {:?}", e);
                    Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
                })?;

            // Application Info
            let app_name = std::ffi::CString::new(config.app_name.clone())
                .unwrap_or_else(|_| std::ffi::CString::new("Pulsar3D Application").unwrap());
            let (major, minor, patch) = config.app_version;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, major, minor, patch))
                .engine_name(c"Pulsar3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_3);

            // Get required extensions
            let display_handle = window.display_handle()
                .map_err(|e| {
                    engine_error!("pulsar3d::vulkan", "Failed to get display handle: {}", e);
                    Error::InitializationFailed(format!("Failed to get display handle: {}", e))
                })?;
            let window_handle = window.window_handle()
                .map_err(|e| {
                    engine_error!("pulsar3d::vulkan", "Failed to get window handle: {}", e);
                    Error::InitializationFailed(format!("Failed to get window handle: {}", e))
                })?;

            let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
                .map_err(|e| {
                    engine_error!("pulsar3d::vulkan", "Failed to get required extensions: {}", e);
                    Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
                })?
                .to_vec();

            // Add debug utils extension if validation is enabled
            if config.enable_validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            // Validation layers
            let layer_names = if config.enable_validation {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| {
                    engine_error!("pulsar3d::vulkan", "Failed to create Vulkan instance: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
                })?;

            // Setup debug messenger if validation is enabled
            let (debug_utils_loader, debug_messenger) = if config.enable_validation {
                let debug_utils = ash::ext::debug_utils::Instance::new(&entry, &instance);

                let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
                    .message_severity(
                        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                            | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                    )
                    .message_type(
                        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                            | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                            | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                    )
                    .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

                let messenger = debug_utils
                    .create_debug_utils_messenger(&debug_info, None)
                    .map_err(|e| {
                        engine_error!("pulsar3d::vulkan", "Failed to create debug messenger: {:?}", e);
                        Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
                    })?;

                (Some(debug_utils), Some(messenger))
            } else {
                (None, None)
            };

            // Create Surface (temporary for queue selection)
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                engine_error!("pulsar3d::vulkan", "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;

            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            // Pick Physical Device
            let physical_devices = instance
                .enumerate_physical_devices()
                .map_err(|e| {
                    engine_error!("pulsar3d::vulkan", "Failed to enumerate physical devices: {:?}", e);
                    Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
                })?;

            let physical_device = physical_devices
                .into_iter()
                .next()
                .ok_or_else(|| {
                    engine_error!("pulsar3d::vulkan", "No Vulkan-capable GPU found");
                    Error::InitializationFailed("No Vulkan-capable GPU found".to_string())
                })?;

            let memory_properties = instance.get_physical_device_memory_properties(physical_device);

            // Find Queue Families
            let queue_families = instance.get_physical_device_queue_family_properties(physical_device);

            let graphics_family_index = queue_families
                .iter()
                .enumerate()
                .find(|(_, qf)| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                .map(|(i, _)| i as u32)
                .ok_or_else(|| {
                    engine_error!("pulsar3d::vulkan", "No graphics queue family found");
                    Error::InitializationFailed("No graphics queue family found".to_string())
                })?;

            let present_family_index = (0..queue_families.len() as u32)
                .find(|&i| {
                    surface_loader
                        .get_physical_device_surface_support(physical_device, i, surface)
                        .unwrap_or(false)
                })
                .ok_or_else(|| {
                    engine_error!("pulsar3d::vulkan", "No present queue family found");
                    Error::InitializationFailed("No present queue family found".to_string())
                })?;

            // Destroy temporary surface
            surface_loader.destroy_surface(surface, None);

            // Create Logical Device
            let queue_priorities = [1.0];
            let queue_create_infos = if graphics_family_index == present_family_index {
                vec![
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(graphics_family_index)
                        .queue_priorities(&queue_priorities),
                ]
            } else {
                vec![
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(graphics_family_index)
                        .queue_priorities(&queue_priorities),
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(present_family_index)
                        .queue_priorities(&queue_priorities),
                ]
            };

            let device_extension_names = vec![ash::khr::swapchain::NAME.as_ptr()];

            let device_features = vk::PhysicalDeviceFeatures::default()
                .sampler_anisotropy(true);

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .enabled_features(&device_features);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    engine_error!("pulsar3d::vulkan", "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            let graphics_queue = device.get_device_queue(graphics_family_index, 0);
            let present_queue = device.get_device_queue(present_family_index, 0);

            let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);

            // Create command pool (RESET so frame command buffers can re-begin)
            let pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(graphics_family_index)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = device.create_command_pool(&pool_create_info, None)
                .map_err(|e| {
                    engine_error!("pulsar3d::vulkan", "Failed to create command pool: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
                })?;

            // Create descriptor pool
            let pool_sizes = [
                vk::DescriptorPoolSize {
                    ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                    descriptor_count: 1024,
                },
                vk::DescriptorPoolSize {
                    ty: vk::DescriptorType::UNIFORM_BUFFER,
                    descriptor_count: 1024,
                },
            ];
            let descriptor_pool_info = vk::DescriptorPoolCreateInfo::default()
                .pool_sizes(&pool_sizes)
                .max_sets(1024);

            let descriptor_pool = device.create_descriptor_pool(&descriptor_pool_info, None)
                .map_err(|e| {
                    engine_error!("pulsar3d::vulkan", "Failed to create descriptor pool: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create descriptor pool: {:?}", e))
                })?;

            // Create shared sampler for texture bindings
            let sampler_create_info = vk::SamplerCreateInfo::default()
                .mag_filter(vk::Filter::LINEAR)
                .min_filter(vk::Filter::LINEAR)
                .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
                .address_mode_u(vk::SamplerAddressMode::REPEAT)
                .address_mode_v(vk::SamplerAddressMode::REPEAT)
                .address_mode_w(vk::SamplerAddressMode::REPEAT)
                .anisotropy_enable(true)
                .max_anisotropy(16.0)
                .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
                .compare_op(vk::CompareOp::ALWAYS)
                .max_lod(vk::LOD_CLAMP_NONE);

            let sampler = device.create_sampler(&sampler_create_info, None)
                .map_err(|e| {
                    engine_error!("pulsar3d::vulkan", "Failed to create sampler: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create sampler: {:?}", e))
                })?;

            engine_info!(
                "pulsar3d::vulkan",
                "Vulkan device created (graphics family: {}, present family: {})",
                graphics_family_index,
                present_family_index
            );

            Ok(Self {
                entry,
                instance,
                physical_device,
                device,
                memory_properties,
                graphics_queue,
                graphics_queue_family: graphics_family_index,
                present_queue,
                present_queue_family: present_family_index,
                surface_loader,
                swapchain_loader,
                command_pool,
                descriptor_pool,
                sampler,
                debug_utils_loader,
                debug_messenger,
                display_handle: display_handle.as_raw(),
                window_handle: window_handle.as_raw(),
                frame_sync: Mutex::new(FxHashMap::default()),
            })
        }
    }

    /// Find a memory type index matching the requirement bits and properties
    pub(crate) fn find_memory_type(
        &self,
        type_bits: u32,
        properties: vk::MemoryPropertyFlags,
    ) -> Result<u32> {
        for i in 0..self.memory_properties.memory_type_count {
            if type_bits & (1 << i) != 0
                && self.memory_properties.memory_types[i as usize]
                    .property_flags
                    .contains(properties)
            {
                return Ok(i);
            }
        }
        engine_bail!(
            "pulsar3d::vulkan",
            "No suitable memory type (bits: {:#x}, properties: {:?})",
            type_bits,
            properties
        );
    }

    /// Create a buffer and bind freshly allocated memory with the given
    /// properties
    pub(crate) fn create_raw_buffer(
        &self,
        size: u64,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> Result<(vk::Buffer, vk::DeviceMemory)> {
        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = self.device.create_buffer(&buffer_create_info, None)
                .map_err(|e| {
                    engine_err!("pulsar3d::vulkan", "Failed to create buffer: {:?}", e)
                })?;

            let requirements = self.device.get_buffer_memory_requirements(buffer);
            let memory_type = match self.find_memory_type(requirements.memory_type_bits, properties) {
                Ok(index) => index,
                Err(e) => {
                    self.device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };

            let allocate_info = vk::MemoryAllocateInfo::default()
                .allocation_size(requirements.size)
                .memory_type_index(memory_type);

            let memory = match self.device.allocate_memory(&allocate_info, None) {
                Ok(memory) => memory,
                Err(e) => {
                    self.device.destroy_buffer(buffer, None);
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!(
                        "pulsar3d::vulkan",
                        "Out of GPU memory for buffer ({:.2} MB): {:?}",
                        size_mb,
                        e
                    );
                    return Err(Error::OutOfMemory);
                }
            };

            if let Err(e) = self.device.bind_buffer_memory(buffer, memory, 0) {
                self.device.destroy_buffer(buffer, None);
                self.device.free_memory(memory, None);
                return Err(engine_err!("pulsar3d::vulkan", "Failed to bind buffer memory: {:?}", e));
            }

            Ok((buffer, memory))
        }
    }

    /// Begin a scope command buffer for a one-shot upload or transition
    pub(crate) fn begin_scope_commands(&self) -> Result<vk::CommandBuffer> {
        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(self.command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffer = self.device.allocate_command_buffers(&allocate_info)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to allocate scope command buffer: {:?}", e))?[0];

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

            self.device.begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| {
                    self.device.free_command_buffers(self.command_pool, &[command_buffer]);
                    engine_err!("pulsar3d::vulkan", "Failed to begin scope command buffer: {:?}", e)
                })?;

            Ok(command_buffer)
        }
    }

    /// End, submit, and wait for a scope command buffer, then free it
    pub(crate) fn end_scope_commands(&self, command_buffer: vk::CommandBuffer) -> Result<()> {
        unsafe {
            let result = self.device.end_command_buffer(command_buffer)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to end scope command buffer: {:?}", e))
                .and_then(|()| {
                    let command_buffers = [command_buffer];
                    let submit_info = vk::SubmitInfo::default()
                        .command_buffers(&command_buffers);

                    self.device
                        .queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
                        .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to submit scope command buffer: {:?}", e))
                })
                .and_then(|()| {
                    self.device.queue_wait_idle(self.graphics_queue)
                        .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to wait for scope command buffer: {:?}", e))
                });

            self.device.free_command_buffers(self.command_pool, &[command_buffer]);
            result
        }
    }

    /// Tear down a partially created swap chain after a mid-creation
    /// failure: the views and semaphores made so far, then the swap chain
    /// and its surface
    pub(crate) unsafe fn destroy_partial_swapchain(
        &self,
        swapchain: vk::SwapchainKHR,
        surface: vk::SurfaceKHR,
        image_views: &[vk::ImageView],
        semaphores: &[vk::Semaphore],
    ) {
        for &view in image_views {
            self.device.destroy_image_view(view, None);
        }
        for &semaphore in semaphores {
            self.device.destroy_semaphore(semaphore, None);
        }
        self.swapchain_loader.destroy_swapchain(swapchain, None);
        self.surface_loader.destroy_surface(surface, None);
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            // Wait for device to finish
            self.device.device_wait_idle().ok();

            // Destroy any frame sync state left behind by undestroyed swap
            // chains
            for (_, sync) in self.frame_sync.get_mut().unwrap().drain() {
                self.device.destroy_semaphore(sync.image_available, None);
                self.device.destroy_semaphore(sync.render_finished, None);
                self.device.destroy_fence(sync.in_flight, None);
            }

            self.device.destroy_sampler(self.sampler, None);
            self.device.destroy_descriptor_pool(self.descriptor_pool, None);
            self.device.destroy_command_pool(self.command_pool, None);

            // Destroy debug messenger BEFORE device and instance
            if let (Some(debug_utils), Some(messenger)) =
                (&self.debug_utils_loader, &self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }

            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}
