/// Vulkan debug messenger - validation layer messages with colored output

use ash::vk;
use colored::*;
use std::ffi::CStr;

/// Vulkan debug messenger callback
///
/// Called by the validation layers; formats and prints the message with a
/// colored severity tag. Always returns `VK_FALSE` (never aborts the
/// triggering call).
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    let callback_data = *p_callback_data;
    let message_id_name = if callback_data.p_message_id_name.is_null() {
        "Unknown"
    } else {
        CStr::from_ptr(callback_data.p_message_id_name)
            .to_str()
            .unwrap_or("Invalid UTF-8")
    };
    let message = if callback_data.p_message.is_null() {
        "No message"
    } else {
        CStr::from_ptr(callback_data.p_message)
            .to_str()
            .unwrap_or("Invalid UTF-8")
    };

    let severity_tag = match message_severity {
        s if s.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) => "VK ERROR".red().bold(),
        s if s.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) => "VK WARN ".yellow(),
        s if s.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) => "VK INFO ".green(),
        _ => "VK TRACE".bright_black(),
    };

    let type_tag = if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "performance"
    } else {
        "general"
    };

    println!(
        "[{}] [{}] {}: {}",
        severity_tag,
        type_tag.bright_blue(),
        message_id_name,
        message
    );

    vk::FALSE
}
