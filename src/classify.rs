use std::fmt;

use crate::registry::Registry;
use crate::types::{CommandId, FatalError};

/// Table a command's address is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Dispatch {
    Global,
    Instance,
    Device,
}

impl fmt::Display for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dispatch::Global => "global",
            Dispatch::Instance => "instance",
            Dispatch::Device => "device",
        })
    }
}

const GET_INSTANCE_PROC_ADDR: &str = "vkGetInstanceProcAddr";
const GET_DEVICE_PROC_ADDR: &str = "vkGetDeviceProcAddr";
const DEVICE: &str = "VkDevice";
const INSTANCE: &str = "VkInstance";

/// Buckets a command by the handle its first parameter descends from.
pub fn classify(registry: &Registry, id: CommandId) -> Result<Dispatch, FatalError> {
    let command = &registry.commands[registry.resolve_command_alias(id)?];
    let name = registry.commands[id].name.as_str();

    if name == GET_INSTANCE_PROC_ADDR || command.name == GET_INSTANCE_PROC_ADDR {
        return Ok(Dispatch::Global);
    }
    if name == GET_DEVICE_PROC_ADDR || command.name == GET_DEVICE_PROC_ADDR {
        return Ok(Dispatch::Instance);
    }

    let first = match command.params.first().and_then(|p| p.ty.target()) {
        Some(ty) => ty,
        None => return Ok(Dispatch::Global),
    };

    for ty in registry.handle_ancestry(first)? {
        match registry.types[ty].name.as_str() {
            DEVICE => return Ok(Dispatch::Device),
            INSTANCE => return Ok(Dispatch::Instance),
            _ => {}
        }
    }
    Ok(Dispatch::Global)
}
