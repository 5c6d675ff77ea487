use gst::prelude::*;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

use crate::engine::EngineError;

/// Required GStreamer elements that must be present
const REQUIRED_ELEMENTS: &[&str] = &[
    "playbin",
    "uridecodebin",
    "filesrc",
    "videoconvert",
    "autovideosink",
    "autoaudiosink",
];

/// Optional elements that enhance functionality
const OPTIONAL_ELEMENTS: &[&str] = &[
    // Network sources
    "rtspsrc",
    "souphttpsrc",
    "udpsrc",
    "hlsdemux",
    // Software decoders
    "avdec_h264",
    "avdec_h265",
    "openh264dec",
    "dav1ddec",
];

static INITIALIZED: OnceLock<Result<(), String>> = OnceLock::new();
static HARDWARE_DECODERS_DEMOTED: OnceLock<usize> = OnceLock::new();

/// Represents the capabilities detected in the GStreamer installation
#[derive(Debug, Clone)]
pub struct GstCapabilities {
    pub has_rtsp: bool,
    pub has_http: bool,
    pub has_software_h264: bool,
    pub available_elements: HashMap<String, bool>,
}

impl GstCapabilities {
    /// Check if a specific element is available
    pub fn has_element(&self, element: &str) -> bool {
        self.available_elements.get(element).copied().unwrap_or(false)
    }
}

/// Run `gst::init` once for the whole process. Later calls return the
/// outcome of the first one.
pub fn initialize_once() -> Result<(), EngineError> {
    INITIALIZED
        .get_or_init(|| {
            info!("Initializing GStreamer");
            gst::init().map_err(|e| {
                error!("Failed to initialize GStreamer: {}", e);
                e.to_string()
            })?;

            let (major, minor, micro, nano) = gst::version();
            info!("GStreamer version: {}.{}.{}.{}", major, minor, micro, nano);

            if let Ok(debug_str) = std::env::var("GST_DEBUG") {
                debug!("GST_DEBUG set to: {}", debug_str);
            }
            if let Ok(plugin_path) = std::env::var("GST_PLUGIN_PATH") {
                info!("Using custom GST_PLUGIN_PATH: {}", plugin_path);
            }
            Ok(())
        })
        .clone()
        .map_err(EngineError::Initialization)
}

/// Initialize GStreamer and check the installation for the elements tiles
/// need.
pub fn initialize() -> Result<GstCapabilities, EngineError> {
    initialize_once()?;
    let capabilities = discover_plugins()?;

    info!("GStreamer capabilities detected:");
    info!("  RTSP support: {}", capabilities.has_rtsp);
    info!("  HTTP support: {}", capabilities.has_http);
    info!("  Software H.264: {}", capabilities.has_software_h264);

    Ok(capabilities)
}

/// Discover available GStreamer plugins and build capability map
pub fn discover_plugins() -> Result<GstCapabilities, EngineError> {
    let mut available_elements = HashMap::new();

    info!("Checking required GStreamer elements...");
    let mut missing_required = Vec::new();

    for element in REQUIRED_ELEMENTS {
        if let Some(factory) = gst::ElementFactory::find(element) {
            debug!("Found required element: {} (rank: {:?})", element, factory.rank());
            available_elements.insert(element.to_string(), true);
        } else {
            error!("Missing required element: {}", element);
            missing_required.push(*element);
            available_elements.insert(element.to_string(), false);
        }
    }

    if !missing_required.is_empty() {
        return Err(EngineError::Initialization(format!(
            "Missing required GStreamer elements: {:?}",
            missing_required
        )));
    }

    info!("All required elements found");

    let mut has_rtsp = false;
    let mut has_http = false;
    let mut has_software_h264 = false;

    for element in OPTIONAL_ELEMENTS {
        if gst::ElementFactory::find(element).is_some() {
            available_elements.insert(element.to_string(), true);
            match *element {
                "rtspsrc" => has_rtsp = true,
                "souphttpsrc" => has_http = true,
                "avdec_h264" | "openh264dec" => has_software_h264 = true,
                _ => {}
            }
        } else {
            debug!("Optional element not found: {}", element);
            available_elements.insert(element.to_string(), false);
        }
    }

    if !has_software_h264 {
        warn!("No software H.264 decoder found, software-only decoding may fail");
    }

    Ok(GstCapabilities {
        has_rtsp,
        has_http,
        has_software_h264,
        available_elements,
    })
}

/// Take every hardware video decoder out of autoplugging so that playbin
/// always picks a software decoder. Runs once per process and returns the
/// number of factories demoted.
pub fn demote_hardware_decoders() -> usize {
    *HARDWARE_DECODERS_DEMOTED.get_or_init(|| {
        let decoders = gst::ElementFactory::factories_with_type(
            gst::ElementFactoryType::DECODER,
            gst::Rank::NONE,
        );

        let mut demoted = 0;
        for factory in decoders {
            let is_hardware = factory
                .metadata(gst::ELEMENT_METADATA_KLASS)
                .is_some_and(|klass| klass.contains("Hardware"));
            if is_hardware {
                debug!("Demoting hardware decoder {}", factory.name());
                factory.set_rank(gst::Rank::NONE);
                demoted += 1;
            }
        }

        info!("Demoted {} hardware decoders", demoted);
        demoted
    })
}

/// Print detailed plugin information (for --check-plugins flag)
pub fn print_plugin_info(capabilities: &GstCapabilities) {
    println!("\nGStreamer Plugin Discovery Report");
    println!("==================================");

    let (major, minor, micro, nano) = gst::version();
    println!("\nGStreamer Version: {}.{}.{}.{}", major, minor, micro, nano);

    if let Ok(plugin_path) = std::env::var("GST_PLUGIN_PATH") {
        println!("Custom Plugin Path: {}", plugin_path);
    }

    println!("\nRequired Elements:");
    for element in REQUIRED_ELEMENTS {
        let status = if capabilities.has_element(element) { "✓" } else { "✗" };
        println!("  {} {}", status, element);
    }

    println!("\nOptional Elements:");
    for element in OPTIONAL_ELEMENTS {
        let status = if capabilities.has_element(element) { "✓" } else { "✗" };
        println!("  {} {}", status, element);
    }

    println!("\nCapabilities Summary:");
    println!("  RTSP Sources: {}", if capabilities.has_rtsp { "Yes" } else { "No" });
    println!("  HTTP Sources: {}", if capabilities.has_http { "Yes" } else { "No" });
    println!(
        "  Software H.264: {}",
        if capabilities.has_software_h264 { "Yes" } else { "No" }
    );

    let registry = gst::Registry::get();
    let plugins = registry.plugins();
    println!("\nRegistry Statistics:");
    println!("  Total Plugins: {}", plugins.len());
}
