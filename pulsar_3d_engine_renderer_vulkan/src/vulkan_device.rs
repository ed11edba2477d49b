/// NativeDevice implementation for VulkanDevice
///
/// Handles cross the trait boundary as raw u64 values and are rehydrated
/// here with `vk::Handle::from_raw`. The rendering core guarantees handle
/// validity (it destroys nothing that is still in use), so no registry is
/// kept on this side apart from the per-swap-chain frame pacing state.

use pulsar_3d_engine::pulsar3d::{Error, Result};
use pulsar_3d_engine::pulsar3d::device::{
    AcquireResult, CreatedSwapchain, DescriptorType, NativeBuffer,
    NativeCommandBuffer, NativeDescriptorSet, NativeDescriptorSetLayout,
    NativeDevice, NativeFramebuffer, NativeImage, NativePipeline,
    NativeRenderPass, NativeShaderModule, NativeSwapchain, PipelineStateDesc,
    PresentResult, RawHandle, RenderPassDesc, NULL_HANDLE,
};
use pulsar_3d_engine::pulsar3d::render::{
    BufferUsage, ClearValue, CommandBufferUsage, Format, ImageLayout,
    ImageUsage, IndexType, MemoryLocation, Rect2D, Viewport,
};
use pulsar_3d_engine::{engine_trace, engine_error, engine_err, engine_bail};
use ash::vk;
use ash::vk::Handle;

use crate::convert::{
    access_mask_to_vk, aspect_mask_for, buffer_usage_to_vk, choose_surface_format,
    clear_value_to_vk, command_buffer_usage_to_vk, descriptor_type_to_vk, format_to_vk,
    image_usage_to_vk, index_type_to_vk, layout_to_vk, stage_mask_to_vk,
    vk_format_to_format,
};
use crate::vulkan::{FrameSync, VulkanDevice};

/// Access and stage masks for an image layout transition
fn transition_masks(
    from: ImageLayout,
    to: ImageLayout,
) -> (vk::AccessFlags, vk::AccessFlags, vk::PipelineStageFlags, vk::PipelineStageFlags) {
    match (from, to) {
        (ImageLayout::Undefined, ImageLayout::TransferDst) => (
            vk::AccessFlags::empty(),
            vk::AccessFlags::TRANSFER_WRITE,
            vk::PipelineStageFlags::TOP_OF_PIPE,
            vk::PipelineStageFlags::TRANSFER,
        ),
        (ImageLayout::TransferDst, ImageLayout::ShaderReadOnly) => (
            vk::AccessFlags::TRANSFER_WRITE,
            vk::AccessFlags::SHADER_READ,
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::FRAGMENT_SHADER,
        ),
        (ImageLayout::Undefined, ImageLayout::ShaderReadOnly) => (
            vk::AccessFlags::empty(),
            vk::AccessFlags::SHADER_READ,
            vk::PipelineStageFlags::TOP_OF_PIPE,
            vk::PipelineStageFlags::FRAGMENT_SHADER,
        ),
        (ImageLayout::Undefined, ImageLayout::DepthStencilAttachment) => (
            vk::AccessFlags::empty(),
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            vk::PipelineStageFlags::TOP_OF_PIPE,
            vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
                | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
        ),
        (ImageLayout::Undefined, ImageLayout::ColorAttachment) => (
            vk::AccessFlags::empty(),
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            vk::PipelineStageFlags::TOP_OF_PIPE,
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
        ),
        _ => (
            vk::AccessFlags::MEMORY_WRITE,
            vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::PipelineStageFlags::ALL_COMMANDS,
        ),
    }
}

impl NativeDevice for VulkanDevice {
    // ===== BUFFERS =====

    fn create_buffer(
        &self,
        size: u64,
        usage: BufferUsage,
        location: MemoryLocation,
    ) -> Result<NativeBuffer> {
        let properties = match location {
            MemoryLocation::DeviceLocal => vk::MemoryPropertyFlags::DEVICE_LOCAL,
            MemoryLocation::HostVisible => {
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT
            }
        };

        let (buffer, memory) =
            self.create_raw_buffer(size, buffer_usage_to_vk(usage), properties)?;

        Ok(NativeBuffer {
            buffer: buffer.as_raw(),
            memory: memory.as_raw(),
        })
    }

    fn destroy_buffer(&self, buffer: NativeBuffer) -> Result<()> {
        unsafe {
            self.device.destroy_buffer(vk::Buffer::from_raw(buffer.buffer), None);
            self.device.free_memory(vk::DeviceMemory::from_raw(buffer.memory), None);
        }
        Ok(())
    }

    fn map_memory(&self, buffer: &NativeBuffer, size: u64) -> Result<*mut u8> {
        unsafe {
            let ptr = self.device
                .map_memory(
                    vk::DeviceMemory::from_raw(buffer.memory),
                    0,
                    size,
                    vk::MemoryMapFlags::empty(),
                )
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to map buffer memory: {:?}", e))?;
            Ok(ptr as *mut u8)
        }
    }

    fn unmap_memory(&self, buffer: &NativeBuffer) -> Result<()> {
        unsafe {
            self.device.unmap_memory(vk::DeviceMemory::from_raw(buffer.memory));
        }
        Ok(())
    }

    fn upload_buffer(&self, buffer: &NativeBuffer, data: &[u8]) -> Result<()> {
        let size = data.len() as u64;
        let (staging_buffer, staging_memory) = self.create_raw_buffer(
            size,
            vk::BufferUsageFlags::TRANSFER_SRC,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )?;

        let result = (|| unsafe {
            let ptr = self.device
                .map_memory(staging_memory, 0, size, vk::MemoryMapFlags::empty())
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to map staging buffer: {:?}", e))?;
            std::ptr::copy_nonoverlapping(data.as_ptr(), ptr as *mut u8, data.len());
            self.device.unmap_memory(staging_memory);

            let command_buffer = self.begin_scope_commands()?;
            let region = vk::BufferCopy::default().size(size);
            self.device.cmd_copy_buffer(
                command_buffer,
                staging_buffer,
                vk::Buffer::from_raw(buffer.buffer),
                &[region],
            );
            self.end_scope_commands(command_buffer)
        })();

        unsafe {
            self.device.destroy_buffer(staging_buffer, None);
            self.device.free_memory(staging_memory, None);
        }
        result
    }

    // ===== IMAGES =====

    fn create_image(
        &self,
        width: u32,
        height: u32,
        format: Format,
        usage: ImageUsage,
    ) -> Result<NativeImage> {
        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .extent(vk::Extent3D { width, height, depth: 1 })
                .mip_levels(1)
                .array_layers(1)
                .format(format_to_vk(format))
                .tiling(vk::ImageTiling::OPTIMAL)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .usage(image_usage_to_vk(usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .samples(vk::SampleCountFlags::TYPE_1);

            let image = self.device.create_image(&image_create_info, None)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to create image: {:?}", e))?;

            let requirements = self.device.get_image_memory_requirements(image);
            let memory_type = match self.find_memory_type(
                requirements.memory_type_bits,
                vk::MemoryPropertyFlags::DEVICE_LOCAL,
            ) {
                Ok(index) => index,
                Err(e) => {
                    self.device.destroy_image(image, None);
                    return Err(e);
                }
            };

            let allocate_info = vk::MemoryAllocateInfo::default()
                .allocation_size(requirements.size)
                .memory_type_index(memory_type);

            let memory = match self.device.allocate_memory(&allocate_info, None) {
                Ok(memory) => memory,
                Err(e) => {
                    self.device.destroy_image(image, None);
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!(
                        "pulsar3d::vulkan",
                        "Out of GPU memory for {}x{} image ({:.2} MB): {:?}",
                        width,
                        height,
                        size_mb,
                        e
                    );
                    return Err(Error::OutOfMemory);
                }
            };

            if let Err(e) = self.device.bind_image_memory(image, memory, 0) {
                self.device.destroy_image(image, None);
                self.device.free_memory(memory, None);
                return Err(engine_err!("pulsar3d::vulkan", "Failed to bind image memory: {:?}", e));
            }

            Ok(NativeImage {
                image: image.as_raw(),
                memory: memory.as_raw(),
                view: NULL_HANDLE,
            })
        }
    }

    fn create_image_view(&self, image: &NativeImage, format: Format) -> Result<RawHandle> {
        unsafe {
            let create_info = vk::ImageViewCreateInfo::default()
                .image(vk::Image::from_raw(image.image))
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format_to_vk(format))
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: aspect_mask_for(format),
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = self.device.create_image_view(&create_info, None)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to create image view: {:?}", e))?;

            Ok(view.as_raw())
        }
    }

    fn transition_image_layout(
        &self,
        image: &NativeImage,
        format: Format,
        from: ImageLayout,
        to: ImageLayout,
    ) -> Result<()> {
        let (src_access, dst_access, src_stage, dst_stage) = transition_masks(from, to);

        let command_buffer = self.begin_scope_commands()?;
        unsafe {
            let barrier = vk::ImageMemoryBarrier::default()
                .old_layout(layout_to_vk(from))
                .new_layout(layout_to_vk(to))
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(vk::Image::from_raw(image.image))
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: aspect_mask_for(format),
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .src_access_mask(src_access)
                .dst_access_mask(dst_access);

            self.device.cmd_pipeline_barrier(
                command_buffer,
                src_stage,
                dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }
        self.end_scope_commands(command_buffer)
    }

    fn upload_image(
        &self,
        image: &NativeImage,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<()> {
        let size = data.len() as u64;
        let (staging_buffer, staging_memory) = self.create_raw_buffer(
            size,
            vk::BufferUsageFlags::TRANSFER_SRC,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )?;

        let result = (|| unsafe {
            let ptr = self.device
                .map_memory(staging_memory, 0, size, vk::MemoryMapFlags::empty())
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to map staging buffer: {:?}", e))?;
            std::ptr::copy_nonoverlapping(data.as_ptr(), ptr as *mut u8, data.len());
            self.device.unmap_memory(staging_memory);

            let command_buffer = self.begin_scope_commands()?;
            let region = vk::BufferImageCopy::default()
                .image_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    mip_level: 0,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .image_extent(vk::Extent3D { width, height, depth: 1 });

            self.device.cmd_copy_buffer_to_image(
                command_buffer,
                staging_buffer,
                vk::Image::from_raw(image.image),
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );
            self.end_scope_commands(command_buffer)
        })();

        unsafe {
            self.device.destroy_buffer(staging_buffer, None);
            self.device.free_memory(staging_memory, None);
        }
        result
    }

    fn destroy_image(&self, image: NativeImage) -> Result<()> {
        unsafe {
            if image.view != NULL_HANDLE {
                self.device.destroy_image_view(vk::ImageView::from_raw(image.view), None);
            }
            self.device.destroy_image(vk::Image::from_raw(image.image), None);
            self.device.free_memory(vk::DeviceMemory::from_raw(image.memory), None);
        }
        Ok(())
    }

    // ===== SHADERS AND PIPELINES =====

    fn create_shader_module(&self, bytecode: &[u8]) -> Result<NativeShaderModule> {
        let code = ash::util::read_spv(&mut std::io::Cursor::new(bytecode))
            .map_err(|e| engine_err!("pulsar3d::vulkan", "Invalid SPIR-V bytecode: {:?}", e))?;

        unsafe {
            let create_info = vk::ShaderModuleCreateInfo::default().code(&code);
            let module = self.device.create_shader_module(&create_info, None)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to create shader module: {:?}", e))?;

            Ok(NativeShaderModule { module: module.as_raw() })
        }
    }

    fn destroy_shader_module(&self, module: NativeShaderModule) -> Result<()> {
        unsafe {
            self.device
                .destroy_shader_module(vk::ShaderModule::from_raw(module.module), None);
        }
        Ok(())
    }

    fn create_pipeline(&self, desc: &PipelineStateDesc) -> Result<NativePipeline> {
        unsafe {
            let stages = [
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::VERTEX)
                    .module(vk::ShaderModule::from_raw(desc.vertex_module.module))
                    .name(c"main"),
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::FRAGMENT)
                    .module(vk::ShaderModule::from_raw(desc.fragment_module.module))
                    .name(c"main"),
            ];

            let binding_descriptions = if desc.vertex_stride > 0 {
                vec![vk::VertexInputBindingDescription {
                    binding: 0,
                    stride: desc.vertex_stride,
                    input_rate: vk::VertexInputRate::VERTEX,
                }]
            } else {
                Vec::new()
            };

            let attribute_descriptions: Vec<vk::VertexInputAttributeDescription> = desc
                .attributes
                .iter()
                .map(|attr| vk::VertexInputAttributeDescription {
                    location: attr.location,
                    binding: 0,
                    format: format_to_vk(attr.format),
                    offset: attr.offset,
                })
                .collect();

            let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
                .vertex_binding_descriptions(&binding_descriptions)
                .vertex_attribute_descriptions(&attribute_descriptions);

            let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
                .topology(vk::PrimitiveTopology::TRIANGLE_LIST);

            // Viewport and scissor are dynamic state; only the counts matter
            let viewport_state = vk::PipelineViewportStateCreateInfo::default()
                .viewport_count(1)
                .scissor_count(1);

            let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
                .polygon_mode(vk::PolygonMode::FILL)
                .cull_mode(vk::CullModeFlags::BACK)
                .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
                .line_width(1.0);

            let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
                .rasterization_samples(vk::SampleCountFlags::TYPE_1);

            let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
                .depth_test_enable(true)
                .depth_write_enable(true)
                .depth_compare_op(vk::CompareOp::LESS);

            let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
                .color_write_mask(vk::ColorComponentFlags::RGBA)];

            let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
                .attachments(&color_blend_attachments);

            let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
            let dynamic_state = vk::PipelineDynamicStateCreateInfo::default()
                .dynamic_states(&dynamic_states);

            let set_layouts: Vec<vk::DescriptorSetLayout> = desc
                .set_layout
                .iter()
                .map(|layout| vk::DescriptorSetLayout::from_raw(layout.layout))
                .collect();

            let layout_create_info = vk::PipelineLayoutCreateInfo::default()
                .set_layouts(&set_layouts);

            let layout = self.device.create_pipeline_layout(&layout_create_info, None)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to create pipeline layout: {:?}", e))?;

            let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
                .stages(&stages)
                .vertex_input_state(&vertex_input_state)
                .input_assembly_state(&input_assembly_state)
                .viewport_state(&viewport_state)
                .rasterization_state(&rasterization_state)
                .multisample_state(&multisample_state)
                .depth_stencil_state(&depth_stencil_state)
                .color_blend_state(&color_blend_state)
                .dynamic_state(&dynamic_state)
                .layout(layout)
                .render_pass(vk::RenderPass::from_raw(desc.render_pass.render_pass))
                .subpass(0);

            let pipeline = match self.device.create_graphics_pipelines(
                vk::PipelineCache::null(),
                &[pipeline_create_info],
                None,
            ) {
                Ok(pipelines) => pipelines[0],
                Err((_, e)) => {
                    self.device.destroy_pipeline_layout(layout, None);
                    return Err(engine_err!("pulsar3d::vulkan", "Failed to create graphics pipeline: {:?}", e));
                }
            };

            Ok(NativePipeline {
                pipeline: pipeline.as_raw(),
                layout: layout.as_raw(),
            })
        }
    }

    fn destroy_pipeline(&self, pipeline: NativePipeline) -> Result<()> {
        unsafe {
            self.device.destroy_pipeline(vk::Pipeline::from_raw(pipeline.pipeline), None);
            self.device
                .destroy_pipeline_layout(vk::PipelineLayout::from_raw(pipeline.layout), None);
        }
        Ok(())
    }

    // ===== RENDER PASSES AND FRAMEBUFFERS =====

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<NativeRenderPass> {
        struct SubpassRefs {
            input: Vec<vk::AttachmentReference>,
            color: Vec<vk::AttachmentReference>,
            resolve: Vec<vk::AttachmentReference>,
            depth_stencil: Option<vk::AttachmentReference>,
        }

        let attachments: Vec<vk::AttachmentDescription> = desc
            .attachments
            .iter()
            .map(|attachment| vk::AttachmentDescription {
                format: format_to_vk(attachment.format),
                samples: vk::SampleCountFlags::TYPE_1,
                load_op: vk::AttachmentLoadOp::CLEAR,
                store_op: vk::AttachmentStoreOp::STORE,
                stencil_load_op: vk::AttachmentLoadOp::DONT_CARE,
                stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
                initial_layout: layout_to_vk(attachment.initial_layout),
                final_layout: layout_to_vk(attachment.final_layout),
                ..Default::default()
            })
            .collect();

        let reference = |index: u32, layout: vk::ImageLayout| vk::AttachmentReference {
            attachment: index,
            layout,
        };

        let subpass_refs: Vec<SubpassRefs> = desc
            .subpasses
            .iter()
            .map(|subpass| SubpassRefs {
                input: subpass
                    .input
                    .iter()
                    .map(|&i| reference(i, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL))
                    .collect(),
                color: subpass
                    .color
                    .iter()
                    .map(|&i| reference(i, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL))
                    .collect(),
                resolve: subpass
                    .resolve
                    .iter()
                    .map(|&i| reference(i, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL))
                    .collect(),
                depth_stencil: subpass
                    .depth_stencil
                    .map(|i| reference(i, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)),
            })
            .collect();

        // A subpass without a depth attachment passes a null pointer, not
        // an empty array; the builder only sets the pointer when called
        let subpasses: Vec<vk::SubpassDescription> = subpass_refs
            .iter()
            .map(|refs| {
                let mut subpass = vk::SubpassDescription::default()
                    .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
                    .input_attachments(&refs.input)
                    .color_attachments(&refs.color);
                if !refs.resolve.is_empty() {
                    subpass = subpass.resolve_attachments(&refs.resolve);
                }
                if let Some(depth) = &refs.depth_stencil {
                    subpass = subpass.depth_stencil_attachment(depth);
                }
                subpass
            })
            .collect();

        // Engine SUBPASS_EXTERNAL and Vulkan's agree on u32::MAX, so the
        // indices translate verbatim
        let dependencies: Vec<vk::SubpassDependency> = desc
            .dependencies
            .iter()
            .map(|dep| vk::SubpassDependency {
                src_subpass: dep.src_subpass,
                dst_subpass: dep.dst_subpass,
                src_stage_mask: stage_mask_to_vk(dep.src_stage_mask),
                dst_stage_mask: stage_mask_to_vk(dep.dst_stage_mask),
                src_access_mask: access_mask_to_vk(dep.src_access_mask),
                dst_access_mask: access_mask_to_vk(dep.dst_access_mask),
                dependency_flags: vk::DependencyFlags::BY_REGION,
            })
            .collect();

        unsafe {
            let create_info = vk::RenderPassCreateInfo::default()
                .attachments(&attachments)
                .subpasses(&subpasses)
                .dependencies(&dependencies);

            let render_pass = self.device.create_render_pass(&create_info, None)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to create render pass: {:?}", e))?;

            Ok(NativeRenderPass { render_pass: render_pass.as_raw() })
        }
    }

    fn destroy_render_pass(&self, render_pass: NativeRenderPass) -> Result<()> {
        unsafe {
            self.device
                .destroy_render_pass(vk::RenderPass::from_raw(render_pass.render_pass), None);
        }
        Ok(())
    }

    fn create_framebuffer(
        &self,
        render_pass: NativeRenderPass,
        attachment_views: &[RawHandle],
        width: u32,
        height: u32,
    ) -> Result<RawHandle> {
        unsafe {
            let views: Vec<vk::ImageView> = attachment_views
                .iter()
                .map(|&view| vk::ImageView::from_raw(view))
                .collect();

            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(vk::RenderPass::from_raw(render_pass.render_pass))
                .attachments(&views)
                .width(width)
                .height(height)
                .layers(1);

            let framebuffer = self.device.create_framebuffer(&create_info, None)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to create framebuffer: {:?}", e))?;

            Ok(framebuffer.as_raw())
        }
    }

    fn destroy_framebuffer(&self, framebuffer: NativeFramebuffer) -> Result<()> {
        unsafe {
            self.device
                .destroy_framebuffer(vk::Framebuffer::from_raw(framebuffer.framebuffer), None);
            if framebuffer.view != NULL_HANDLE {
                self.device
                    .destroy_image_view(vk::ImageView::from_raw(framebuffer.view), None);
            }
        }
        Ok(())
    }

    // ===== SWAP CHAIN =====

    fn create_swapchain(&self, width: u32, height: u32) -> Result<CreatedSwapchain> {
        unsafe {
            let surface = ash_window::create_surface(
                &self.entry,
                &self.instance,
                self.display_handle,
                self.window_handle,
                None,
            )
            .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to create surface: {:?}", e))?;

            let supported = self.surface_loader
                .get_physical_device_surface_support(
                    self.physical_device,
                    self.present_queue_family,
                    surface,
                )
                .unwrap_or(false);
            if !supported {
                self.surface_loader.destroy_surface(surface, None);
                engine_error!("pulsar3d::vulkan", "Surface cannot present on the device's queues");
                return Err(Error::Unsupported(
                    "Surface cannot present on the device's queues".to_string(),
                ));
            }

            let capabilities = self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, surface)
                .map_err(|e| {
                    self.surface_loader.destroy_surface(surface, None);
                    engine_err!("pulsar3d::vulkan", "Failed to get surface capabilities: {:?}", e)
                })?;

            let formats = self.surface_loader
                .get_physical_device_surface_formats(self.physical_device, surface)
                .map_err(|e| {
                    self.surface_loader.destroy_surface(surface, None);
                    engine_err!("pulsar3d::vulkan", "Failed to get surface formats: {:?}", e)
                })?;

            let surface_format = match choose_surface_format(&formats) {
                Some(format) => format,
                None => {
                    self.surface_loader.destroy_surface(surface, None);
                    engine_error!("pulsar3d::vulkan", "Surface reports no formats");
                    return Err(Error::Unsupported(
                        "Surface reports no formats".to_string(),
                    ));
                }
            };

            let extent = if capabilities.current_extent.width != u32::MAX {
                capabilities.current_extent
            } else {
                vk::Extent2D {
                    width: width.clamp(
                        capabilities.min_image_extent.width,
                        capabilities.max_image_extent.width,
                    ),
                    height: height.clamp(
                        capabilities.min_image_extent.height,
                        capabilities.max_image_extent.height,
                    ),
                }
            };

            let image_count = capabilities.min_image_count + 1;
            let image_count = if capabilities.max_image_count > 0 {
                image_count.min(capabilities.max_image_count)
            } else {
                image_count
            };

            let swapchain_create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(surface)
                .min_image_count(image_count)
                .image_format(surface_format.format)
                .image_color_space(surface_format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(vk::PresentModeKHR::FIFO)
                .clipped(true);

            let swapchain = self.swapchain_loader
                .create_swapchain(&swapchain_create_info, None)
                .map_err(|e| {
                    self.surface_loader.destroy_surface(surface, None);
                    engine_err!("pulsar3d::vulkan", "Failed to create swapchain: {:?}", e)
                })?;

            // Every failure from here on must tear down what already exists:
            // a bare error return would leak a live swapchain+surface pair
            // per retry with no handle ever returned to free them.
            let images = self.swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| {
                    self.destroy_partial_swapchain(swapchain, surface, &[], &[]);
                    engine_err!("pulsar3d::vulkan", "Failed to get swapchain images: {:?}", e)
                })?;

            let mut image_views = Vec::with_capacity(images.len());
            for &image in &images {
                let view_create_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(surface_format.format)
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });

                let view = self.device.create_image_view(&view_create_info, None)
                    .map_err(|e| {
                        self.destroy_partial_swapchain(swapchain, surface, &image_views, &[]);
                        engine_err!("pulsar3d::vulkan", "Failed to create swapchain image view: {:?}", e)
                    })?;
                image_views.push(view);
            }

            // Frame pacing state: fence starts signaled so the first frame's
            // wait returns immediately
            let semaphore_create_info = vk::SemaphoreCreateInfo::default();
            let image_available = self.device.create_semaphore(&semaphore_create_info, None)
                .map_err(|e| {
                    self.destroy_partial_swapchain(swapchain, surface, &image_views, &[]);
                    engine_err!("pulsar3d::vulkan", "Failed to create semaphore: {:?}", e)
                })?;
            let render_finished = self.device.create_semaphore(&semaphore_create_info, None)
                .map_err(|e| {
                    self.destroy_partial_swapchain(
                        swapchain,
                        surface,
                        &image_views,
                        &[image_available],
                    );
                    engine_err!("pulsar3d::vulkan", "Failed to create semaphore: {:?}", e)
                })?;

            let fence_create_info = vk::FenceCreateInfo::default()
                .flags(vk::FenceCreateFlags::SIGNALED);
            let in_flight = self.device.create_fence(&fence_create_info, None)
                .map_err(|e| {
                    self.destroy_partial_swapchain(
                        swapchain,
                        surface,
                        &image_views,
                        &[image_available, render_finished],
                    );
                    engine_err!("pulsar3d::vulkan", "Failed to create fence: {:?}", e)
                })?;

            self.frame_sync.lock().unwrap().insert(
                swapchain.as_raw(),
                FrameSync { image_available, render_finished, in_flight },
            );

            engine_trace!(
                "pulsar3d::vulkan",
                "Swapchain created: {}x{}, {:?}, {} images",
                extent.width,
                extent.height,
                surface_format.format,
                images.len()
            );

            Ok(CreatedSwapchain {
                swapchain: NativeSwapchain {
                    swapchain: swapchain.as_raw(),
                    surface: surface.as_raw(),
                },
                format: vk_format_to_format(surface_format.format),
                width: extent.width,
                height: extent.height,
                image_views: image_views.iter().map(|view| view.as_raw()).collect(),
            })
        }
    }

    fn destroy_swapchain(&self, swapchain: NativeSwapchain) -> Result<()> {
        unsafe {
            if let Some(sync) = self.frame_sync.lock().unwrap().remove(&swapchain.swapchain) {
                self.device.destroy_semaphore(sync.image_available, None);
                self.device.destroy_semaphore(sync.render_finished, None);
                self.device.destroy_fence(sync.in_flight, None);
            }

            self.swapchain_loader
                .destroy_swapchain(vk::SwapchainKHR::from_raw(swapchain.swapchain), None);
            self.surface_loader
                .destroy_surface(vk::SurfaceKHR::from_raw(swapchain.surface), None);
        }
        Ok(())
    }

    // ===== DESCRIPTORS =====

    fn create_descriptor_set_layout(
        &self,
        bindings: &[DescriptorType],
    ) -> Result<NativeDescriptorSetLayout> {
        unsafe {
            let layout_bindings: Vec<vk::DescriptorSetLayoutBinding> = bindings
                .iter()
                .enumerate()
                .map(|(index, &descriptor_type)| {
                    vk::DescriptorSetLayoutBinding::default()
                        .binding(index as u32)
                        .descriptor_type(descriptor_type_to_vk(descriptor_type))
                        .descriptor_count(1)
                        .stage_flags(
                            vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                        )
                })
                .collect();

            let create_info = vk::DescriptorSetLayoutCreateInfo::default()
                .bindings(&layout_bindings);

            let layout = self.device.create_descriptor_set_layout(&create_info, None)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to create descriptor set layout: {:?}", e))?;

            Ok(NativeDescriptorSetLayout { layout: layout.as_raw() })
        }
    }

    fn destroy_descriptor_set_layout(&self, layout: NativeDescriptorSetLayout) -> Result<()> {
        unsafe {
            self.device.destroy_descriptor_set_layout(
                vk::DescriptorSetLayout::from_raw(layout.layout),
                None,
            );
        }
        Ok(())
    }

    fn allocate_descriptor_set(
        &self,
        layout: NativeDescriptorSetLayout,
    ) -> Result<NativeDescriptorSet> {
        unsafe {
            let set_layouts = [vk::DescriptorSetLayout::from_raw(layout.layout)];
            let allocate_info = vk::DescriptorSetAllocateInfo::default()
                .descriptor_pool(self.descriptor_pool)
                .set_layouts(&set_layouts);

            let sets = self.device.allocate_descriptor_sets(&allocate_info)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to allocate descriptor set: {:?}", e))?;

            Ok(NativeDescriptorSet { set: sets[0].as_raw() })
        }
    }

    fn update_descriptor_set(
        &self,
        set: NativeDescriptorSet,
        image: &NativeImage,
    ) -> Result<()> {
        if image.view == NULL_HANDLE {
            engine_bail!("pulsar3d::vulkan", "Cannot bind an image without a view to a descriptor set");
        }

        unsafe {
            let image_info = [vk::DescriptorImageInfo {
                sampler: self.sampler,
                image_view: vk::ImageView::from_raw(image.view),
                image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            }];

            let write = vk::WriteDescriptorSet::default()
                .dst_set(vk::DescriptorSet::from_raw(set.set))
                .dst_binding(0)
                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .image_info(&image_info);

            self.device.update_descriptor_sets(&[write], &[]);
        }
        Ok(())
    }

    // ===== COMMAND BUFFERS =====

    fn allocate_command_buffer(&self) -> Result<NativeCommandBuffer> {
        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(self.command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = self.device.allocate_command_buffers(&allocate_info)
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to allocate command buffer: {:?}", e))?;

            Ok(NativeCommandBuffer { command_buffer: command_buffers[0].as_raw() })
        }
    }

    fn free_command_buffer(&self, command_buffer: NativeCommandBuffer) -> Result<()> {
        unsafe {
            self.device.free_command_buffers(
                self.command_pool,
                &[vk::CommandBuffer::from_raw(command_buffer.command_buffer)],
            );
        }
        Ok(())
    }

    // ===== COMMAND RECORDING =====

    fn cmd_begin(&self, cmd: NativeCommandBuffer, usage: CommandBufferUsage) -> Result<()> {
        unsafe {
            // Pool has RESET_COMMAND_BUFFER, so begin implicitly resets
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(command_buffer_usage_to_vk(usage));

            self.device
                .begin_command_buffer(
                    vk::CommandBuffer::from_raw(cmd.command_buffer),
                    &begin_info,
                )
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to begin command buffer: {:?}", e))
        }
    }

    fn cmd_end(&self, cmd: NativeCommandBuffer) -> Result<()> {
        unsafe {
            self.device
                .end_command_buffer(vk::CommandBuffer::from_raw(cmd.command_buffer))
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to end command buffer: {:?}", e))
        }
    }

    fn cmd_begin_render_pass(
        &self,
        cmd: NativeCommandBuffer,
        render_pass: NativeRenderPass,
        framebuffer: RawHandle,
        width: u32,
        height: u32,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        unsafe {
            let clear_values: Vec<vk::ClearValue> =
                clear_values.iter().map(|&clear| clear_value_to_vk(clear)).collect();

            let begin_info = vk::RenderPassBeginInfo::default()
                .render_pass(vk::RenderPass::from_raw(render_pass.render_pass))
                .framebuffer(vk::Framebuffer::from_raw(framebuffer))
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent: vk::Extent2D { width, height },
                })
                .clear_values(&clear_values);

            self.device.cmd_begin_render_pass(
                vk::CommandBuffer::from_raw(cmd.command_buffer),
                &begin_info,
                vk::SubpassContents::INLINE,
            );
        }
        Ok(())
    }

    fn cmd_end_render_pass(&self, cmd: NativeCommandBuffer) -> Result<()> {
        unsafe {
            self.device
                .cmd_end_render_pass(vk::CommandBuffer::from_raw(cmd.command_buffer));
        }
        Ok(())
    }

    fn cmd_bind_pipeline(&self, cmd: NativeCommandBuffer, pipeline: RawHandle) -> Result<()> {
        unsafe {
            self.device.cmd_bind_pipeline(
                vk::CommandBuffer::from_raw(cmd.command_buffer),
                vk::PipelineBindPoint::GRAPHICS,
                vk::Pipeline::from_raw(pipeline),
            );
        }
        Ok(())
    }

    fn cmd_bind_vertex_buffers(
        &self,
        cmd: NativeCommandBuffer,
        buffers: &[RawHandle],
    ) -> Result<()> {
        unsafe {
            let buffers: Vec<vk::Buffer> =
                buffers.iter().map(|&buffer| vk::Buffer::from_raw(buffer)).collect();
            let offsets = vec![0u64; buffers.len()];

            self.device.cmd_bind_vertex_buffers(
                vk::CommandBuffer::from_raw(cmd.command_buffer),
                0,
                &buffers,
                &offsets,
            );
        }
        Ok(())
    }

    fn cmd_bind_index_buffer(
        &self,
        cmd: NativeCommandBuffer,
        buffer: RawHandle,
        index_type: IndexType,
    ) -> Result<()> {
        unsafe {
            self.device.cmd_bind_index_buffer(
                vk::CommandBuffer::from_raw(cmd.command_buffer),
                vk::Buffer::from_raw(buffer),
                0,
                index_type_to_vk(index_type),
            );
        }
        Ok(())
    }

    fn cmd_bind_descriptor_sets(
        &self,
        cmd: NativeCommandBuffer,
        pipeline_layout: RawHandle,
        set: RawHandle,
    ) -> Result<()> {
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                vk::CommandBuffer::from_raw(cmd.command_buffer),
                vk::PipelineBindPoint::GRAPHICS,
                vk::PipelineLayout::from_raw(pipeline_layout),
                0,
                &[vk::DescriptorSet::from_raw(set)],
                &[],
            );
        }
        Ok(())
    }

    fn cmd_draw_indexed(
        &self,
        cmd: NativeCommandBuffer,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> Result<()> {
        unsafe {
            self.device.cmd_draw_indexed(
                vk::CommandBuffer::from_raw(cmd.command_buffer),
                index_count,
                1,
                first_index,
                vertex_offset,
                0,
            );
        }
        Ok(())
    }

    fn cmd_set_viewport(&self, cmd: NativeCommandBuffer, viewport: Viewport) -> Result<()> {
        unsafe {
            let viewport = vk::Viewport {
                x: viewport.x,
                y: viewport.y,
                width: viewport.width,
                height: viewport.height,
                min_depth: viewport.min_depth,
                max_depth: viewport.max_depth,
            };
            self.device.cmd_set_viewport(
                vk::CommandBuffer::from_raw(cmd.command_buffer),
                0,
                &[viewport],
            );
        }
        Ok(())
    }

    fn cmd_set_scissor(&self, cmd: NativeCommandBuffer, scissor: Rect2D) -> Result<()> {
        unsafe {
            let scissor = vk::Rect2D {
                offset: vk::Offset2D { x: scissor.x, y: scissor.y },
                extent: vk::Extent2D { width: scissor.width, height: scissor.height },
            };
            self.device.cmd_set_scissor(
                vk::CommandBuffer::from_raw(cmd.command_buffer),
                0,
                &[scissor],
            );
        }
        Ok(())
    }

    // ===== FRAME PACING =====

    fn wait_frame_fence(&self, swapchain: &NativeSwapchain) -> Result<()> {
        let sync_map = self.frame_sync.lock().unwrap();
        let sync = match sync_map.get(&swapchain.swapchain) {
            Some(sync) => sync,
            None => engine_bail!(
                "pulsar3d::vulkan",
                "No frame pacing state for swapchain {:#x}",
                swapchain.swapchain
            ),
        };

        unsafe {
            self.device
                .wait_for_fences(&[sync.in_flight], true, u64::MAX)
                .map_err(|e| match e {
                    vk::Result::ERROR_DEVICE_LOST => {
                        engine_error!("pulsar3d::vulkan", "Device lost while waiting for frame fence");
                        Error::DeviceLost
                    }
                    e => engine_err!("pulsar3d::vulkan", "Failed to wait for frame fence: {:?}", e),
                })?;

            self.device.reset_fences(&[sync.in_flight])
                .map_err(|e| engine_err!("pulsar3d::vulkan", "Failed to reset frame fence: {:?}", e))?;
        }
        Ok(())
    }

    fn acquire_next_image(&self, swapchain: &NativeSwapchain) -> Result<AcquireResult> {
        let sync_map = self.frame_sync.lock().unwrap();
        let sync = match sync_map.get(&swapchain.swapchain) {
            Some(sync) => sync,
            None => engine_bail!(
                "pulsar3d::vulkan",
                "No frame pacing state for swapchain {:#x}",
                swapchain.swapchain
            ),
        };

        unsafe {
            match self.swapchain_loader.acquire_next_image(
                vk::SwapchainKHR::from_raw(swapchain.swapchain),
                u64::MAX,
                sync.image_available,
                vk::Fence::null(),
            ) {
                Ok((image_index, _is_suboptimal)) => Ok(AcquireResult::Acquired(image_index)),
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireResult::OutOfDate),
                Err(e) => Err(engine_err!(
                    "pulsar3d::vulkan",
                    "Failed to acquire next swapchain image: {:?}",
                    e
                )),
            }
        }
    }

    fn submit_frame(
        &self,
        cmd: NativeCommandBuffer,
        swapchain: &NativeSwapchain,
    ) -> Result<()> {
        let sync_map = self.frame_sync.lock().unwrap();
        let sync = match sync_map.get(&swapchain.swapchain) {
            Some(sync) => sync,
            None => engine_bail!(
                "pulsar3d::vulkan",
                "No frame pacing state for swapchain {:#x}",
                swapchain.swapchain
            ),
        };

        unsafe {
            let wait_semaphores = [sync.image_available];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let signal_semaphores = [sync.render_finished];
            let command_buffers = [vk::CommandBuffer::from_raw(cmd.command_buffer)];

            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);

            self.device
                .queue_submit(self.graphics_queue, &[submit_info], sync.in_flight)
                .map_err(|e| match e {
                    vk::Result::ERROR_DEVICE_LOST => {
                        engine_error!("pulsar3d::vulkan", "Device lost during frame submit");
                        Error::DeviceLost
                    }
                    e => engine_err!("pulsar3d::vulkan", "Failed to submit frame: {:?}", e),
                })
        }
    }

    fn present(&self, swapchain: &NativeSwapchain, image_index: u32) -> Result<PresentResult> {
        let sync_map = self.frame_sync.lock().unwrap();
        let sync = match sync_map.get(&swapchain.swapchain) {
            Some(sync) => sync,
            None => engine_bail!(
                "pulsar3d::vulkan",
                "No frame pacing state for swapchain {:#x}",
                swapchain.swapchain
            ),
        };

        unsafe {
            let swapchains = [vk::SwapchainKHR::from_raw(swapchain.swapchain)];
            let image_indices = [image_index];
            let wait_semaphores = [sync.render_finished];

            let present_info = vk::PresentInfoKHR::default()
                .wait_semaphores(&wait_semaphores)
                .swapchains(&swapchains)
                .image_indices(&image_indices);

            match self.swapchain_loader.queue_present(self.present_queue, &present_info) {
                Ok(false) => Ok(PresentResult::Presented),
                // Out-of-date at present time still displayed previous
                // frames; report suboptimal and let the caller rebuild
                Ok(true) | Err(vk::Result::SUBOPTIMAL_KHR) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    Ok(PresentResult::Suboptimal)
                }
                Err(vk::Result::ERROR_DEVICE_LOST) => {
                    engine_error!("pulsar3d::vulkan", "Device lost during present");
                    Err(Error::DeviceLost)
                }
                Err(e) => Err(engine_err!(
                    "pulsar3d::vulkan",
                    "Failed to present swapchain image: {:?}",
                    e
                )),
            }
        }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device.device_wait_idle()
                .map_err(|e| match e {
                    vk::Result::ERROR_DEVICE_LOST => {
                        engine_error!("pulsar3d::vulkan", "Device lost while waiting idle");
                        Error::DeviceLost
                    }
                    e => engine_err!("pulsar3d::vulkan", "Failed to wait for device idle: {:?}", e),
                })
        }
    }
}
