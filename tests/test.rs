use pretty_assertions::assert_eq;
use vk_bindgen::emit::{Category, Generator};
use vk_bindgen::naming::decorate;
use vk_bindgen::*;

const REGISTRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<registry>
    <comment>Test registry</comment>
    <platforms>
        <platform name="xlib" protect="VK_USE_PLATFORM_XLIB_KHR" comment="X Window System"/>
    </platforms>
    <tags>
        <tag name="KHR" author="Khronos" contact="someone"/>
        <tag name="EXT" author="Multivendor" contact="someone"/>
    </tags>
    <types comment="Vulkan type definitions">
        <type name="void"/>
        <type name="char"/>
        <type name="float"/>
        <type name="uint32_t"/>
        <type name="uint64_t"/>
        <type category="include" name="X11/Xlib.h"/>
        <type name="Display" requires="X11/Xlib.h"/>
        <type api="vulkan" category="define">#define <name>VK_API_VERSION_1_0</name> <type>VK_MAKE_API_VERSION</type>(0, 1, 0, 0)</type>
        <type category="basetype">typedef <type>uint32_t</type> <name>VkFlags</name>;</type>
        <type category="basetype">typedef <type>uint64_t</type> <name>VkDeviceSize</name>;</type>
        <type category="bitmask" bitvalues="VkQueueFlagBits">typedef <type>VkFlags</type> <name>VkQueueFlags</name>;</type>
        <type name="VkQueueFlagBits" category="enum"/>
        <type name="VkStructureType" category="enum"/>
        <type name="VkResult" category="enum"/>
        <type category="handle" objtypeenum="VK_OBJECT_TYPE_INSTANCE"><type>VK_DEFINE_HANDLE</type>(<name>VkInstance</name>)</type>
        <type category="handle" parent="VkInstance"><type>VK_DEFINE_HANDLE</type>(<name>VkPhysicalDevice</name>)</type>
        <type category="handle" parent="VkPhysicalDevice"><type>VK_DEFINE_HANDLE</type>(<name>VkDevice</name>)</type>
        <type category="handle" parent="VkDevice"><type>VK_DEFINE_HANDLE</type>(<name>VkCommandBuffer</name>)</type>
        <type category="handle" parent="VkInstance"><type>VK_DEFINE_NON_DISPATCHABLE_HANDLE</type>(<name>VkSurfaceKHR</name>)</type>
        <type category="funcpointer">typedef void (VKAPI_PTR *<name>PFN_vkVoidFunction</name>)(void);</type>
        <type category="funcpointer">typedef void* (VKAPI_PTR *<name>PFN_vkAllocationFunction</name>)(
    <type>void</type>*                                       pUserData,
    <type>uint32_t</type>                                    size);</type>
        <type category="struct" name="VkBaseOutStructure">
            <member><type>VkStructureType</type> <name>sType</name></member>
            <member optional="true">struct <type>VkBaseOutStructure</type>* <name>pNext</name></member>
        </type>
        <type category="struct" name="VkApplicationInfo">
            <member values="VK_STRUCTURE_TYPE_APPLICATION_INFO"><type>VkStructureType</type> <name>sType</name></member>
            <member optional="true">const <type>void</type>*     <name>pNext</name></member>
            <member optional="true" len="null-terminated">const <type>char</type>*     <name>pApplicationName</name></member>
            <member><type>uint32_t</type>        <name>apiVersion</name></member>
        </type>
        <type category="struct" name="VkInstanceCreateInfo">
            <member><type>VkStructureType</type> <name>sType</name></member>
            <member optional="true">const <type>void</type>*     <name>pNext</name></member>
            <member optional="true">const <type>VkApplicationInfo</type>* <name>pApplicationInfo</name></member>
            <member optional="true"><type>uint32_t</type>               <name>enabledLayerCount</name></member>
            <member len="enabledLayerCount,null-terminated">const <type>char</type>* const*      <name>ppEnabledLayerNames</name></member>
            <member api="vulkansc"><type>uint32_t</type> <name>safetyCriticalFlags</name></member>
        </type>
        <type category="struct" name="VkPhysicalDeviceProperties">
            <member><type>uint32_t</type>       <name>apiVersion</name></member>
            <member><type>char</type>           <name>deviceName</name>[<enum>VK_MAX_PHYSICAL_DEVICE_NAME_SIZE</enum>]</member>
            <member><type>float</type>          <name>pointSizeRange</name>[2]</member>
        </type>
        <type category="struct" name="VkXlibSurfaceCreateInfoKHR">
            <member><type>VkStructureType</type> <name>sType</name></member>
            <member><type>Display</type>*        <name>dpy</name></member>
        </type>
        <type category="struct" name="VkFaultData" api="vulkansc">
            <member><type>uint32_t</type> <name>faultLevel</name></member>
        </type>
        <type category="struct" name="VkApplicationInfoKHR" alias="VkApplicationInfo"/>
        <type category="struct" name="VkApplicationInfoEXT" alias="VkApplicationInfoKHR"/>
        <type category="struct" name="VkApplicationChain">
            <member optional="true">const <type>VkApplicationInfoEXT</type>* <name>pInfo</name></member>
        </type>
    </types>
    <enums name="API Constants" comment="Vulkan hardcoded constants">
        <enum type="uint32_t" value="256" name="VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"/>
        <enum type="uint64_t" value="(~0ULL)" name="VK_WHOLE_SIZE"/>
        <enum name="VK_MAX_DEVICE_NAME_SIZE" alias="VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"/>
    </enums>
    <enums name="VkStructureType" type="enum">
        <enum value="0" name="VK_STRUCTURE_TYPE_APPLICATION_INFO"/>
        <enum value="1" name="VK_STRUCTURE_TYPE_INSTANCE_CREATE_INFO"/>
    </enums>
    <enums name="VkResult" type="enum">
        <enum value="0" name="VK_SUCCESS"/>
        <enum value="-3" name="VK_ERROR_INITIALIZATION_FAILED"/>
    </enums>
    <enums name="VkQueueFlagBits" type="bitmask">
        <enum bitpos="0" name="VK_QUEUE_GRAPHICS_BIT"/>
        <enum bitpos="1" name="VK_QUEUE_COMPUTE_BIT"/>
    </enums>
    <commands>
        <command successcodes="VK_SUCCESS" errorcodes="VK_ERROR_INITIALIZATION_FAILED">
            <proto><type>VkResult</type> <name>vkCreateInstance</name></proto>
            <param>const <type>VkInstanceCreateInfo</type>* <name>pCreateInfo</name></param>
            <param><type>VkInstance</type>* <name>pInstance</name></param>
        </command>
        <command>
            <proto><type>PFN_vkVoidFunction</type> <name>vkGetInstanceProcAddr</name></proto>
            <param optional="true"><type>VkInstance</type> <name>instance</name></param>
            <param len="null-terminated">const <type>char</type>* <name>pName</name></param>
        </command>
        <command>
            <proto><type>VkResult</type> <name>vkEnumeratePhysicalDevices</name></proto>
            <param><type>VkInstance</type> <name>instance</name></param>
            <param optional="false,true"><type>uint32_t</type>* <name>pPhysicalDeviceCount</name></param>
            <param optional="true" len="pPhysicalDeviceCount"><type>VkPhysicalDevice</type>* <name>pPhysicalDevices</name></param>
        </command>
        <command queues="graphics,compute" cmdbufferlevel="primary,secondary">
            <proto><type>void</type> <name>vkCmdDispatch</name></proto>
            <param externsync="true"><type>VkCommandBuffer</type> <name>commandBuffer</name></param>
            <param><type>uint32_t</type> <name>groupCountX</name></param>
        </command>
        <command>
            <proto><type>VkResult</type> <name>vkCreateXlibSurfaceKHR</name></proto>
            <param><type>VkInstance</type> <name>instance</name></param>
            <param>const <type>VkXlibSurfaceCreateInfoKHR</type>* <name>pCreateInfo</name></param>
            <param><type>VkSurfaceKHR</type>* <name>pSurface</name></param>
        </command>
        <command api="vulkansc">
            <proto><type>VkResult</type> <name>vkGetFaultData</name></proto>
            <param><type>VkDevice</type> <name>device</name></param>
            <param><type>VkFaultData</type>* <name>pFaults</name></param>
        </command>
        <command name="vkCmdDispatchKHR" alias="vkCmdDispatch"/>
        <command name="vkCmdDispatchEXT" alias="vkCmdDispatchKHR"/>
    </commands>
    <feature api="vulkan,vulkansc" name="VK_VERSION_1_0" number="1.0">
        <require>
            <type name="VkInstanceCreateInfo"/>
            <command name="vkCreateInstance"/>
            <command name="vkGetInstanceProcAddr"/>
        </require>
    </feature>
    <feature api="vulkan" name="VK_VERSION_1_1" number="1.1">
        <require>
            <enum extends="VkStructureType" extnumber="158" offset="0" name="VK_STRUCTURE_TYPE_BIND_BUFFER_MEMORY_INFO"/>
            <enum bitpos="4" extends="VkQueueFlagBits" name="VK_QUEUE_PROTECTED_BIT"/>
        </require>
    </feature>
    <feature api="vulkansc" name="VKSC_VERSION_1_0" number="1.0">
        <require>
            <type name="VkFaultData"/>
            <command name="vkGetFaultData"/>
            <enum extends="VkStructureType" extnumber="299" offset="0" name="VK_STRUCTURE_TYPE_FAULT_DATA"/>
        </require>
    </feature>
    <extensions>
        <extension name="VK_KHR_surface" number="1" type="instance" author="KHR" supported="vulkan,vulkansc" sortorder="1">
            <require>
                <enum value="25" name="VK_KHR_SURFACE_SPEC_VERSION"/>
                <enum offset="0" extends="VkResult" dir="-" name="VK_ERROR_SURFACE_LOST_KHR"/>
                <type name="VkSurfaceKHR"/>
            </require>
        </extension>
        <extension name="VK_KHR_xlib_surface" number="5" type="instance" depends="VK_KHR_surface" platform="xlib" supported="vulkan">
            <require>
                <type name="VkXlibSurfaceCreateInfoKHR"/>
                <command name="vkCreateXlibSurfaceKHR"/>
                <enum offset="0" extends="VkStructureType" name="VK_STRUCTURE_TYPE_XLIB_SURFACE_CREATE_INFO_KHR"/>
            </require>
        </extension>
        <extension name="VK_EXT_fault_reporting" number="299" supported="vulkansc">
            <require>
                <enum offset="1" extends="VkStructureType" name="VK_STRUCTURE_TYPE_FAULT_CALLBACK_INFO"/>
            </require>
        </extension>
        <extension name="VK_KHR_device_group_creation" number="71" supported="vulkan">
            <require>
                <enum extends="VkStructureType" name="VK_STRUCTURE_TYPE_BIND_BUFFER_MEMORY_INFO_KHR" alias="VK_STRUCTURE_TYPE_BIND_BUFFER_MEMORY_INFO"/>
                <enum name="VK_STRUCTURE_TYPE_INSTANCE_CREATE_INFO"/>
            </require>
        </extension>
    </extensions>
</registry>
"#;

fn load(api: &str) -> Registry {
    parse_stream(REGISTRY.as_bytes(), api).unwrap()
}

fn field_value(registry: &Registry, name: &str) -> EnumValue {
    let field = registry.find_field(name).unwrap();
    registry.field(field).unwrap().value.clone()
}

#[test]
fn type_aliases_resolve_transitively() {
    let registry = load("vulkan");
    let ext = registry.types.find("VkApplicationInfoEXT").unwrap();
    let target = registry.resolve_type_alias(ext).unwrap();
    assert_eq!(registry.types[target].name, "VkApplicationInfo");

    let dispatch = registry.commands.find("vkCmdDispatchEXT").unwrap();
    let target = registry.resolve_command_alias(dispatch).unwrap();
    assert_eq!(registry.commands[target].name, "vkCmdDispatch");
}

#[test]
fn entities_of_other_apis_are_absent() {
    let registry = load("vulkan");
    assert!(registry.types.find("VkFaultData").is_none());
    assert!(registry.commands.find("vkGetFaultData").is_none());
    assert!(registry.find_field("VK_STRUCTURE_TYPE_FAULT_DATA").is_none());
    assert!(registry.find_field("VK_STRUCTURE_TYPE_FAULT_CALLBACK_INFO").is_none());
    assert!(registry.features.find("VKSC_VERSION_1_0").is_none());
    assert!(registry.extensions.find("VK_EXT_fault_reporting").is_none());
    let create_info = registry.type_by_name("VkInstanceCreateInfo").unwrap();
    assert!(create_info.members.iter().all(|m| m.name != "safetyCriticalFlags"));

    let sc = load("vulkansc");
    assert!(sc.types.find("VkFaultData").is_some());
    assert!(sc.commands.find("vkGetFaultData").is_some());
    assert!(sc.extensions.find("VK_KHR_xlib_surface").is_none());
    assert!(sc.find_field("VK_STRUCTURE_TYPE_BIND_BUFFER_MEMORY_INFO").is_none());
    assert_eq!(
        field_value(&sc, "VK_STRUCTURE_TYPE_FAULT_DATA"),
        EnumValue::Literal(Literal::Int(1_000_298_000))
    );
    assert_eq!(
        field_value(&sc, "VK_STRUCTURE_TYPE_FAULT_CALLBACK_INFO"),
        EnumValue::Literal(Literal::Int(1_000_298_001))
    );
}

#[test]
fn extension_enums_are_patched() {
    let registry = load("vulkan");
    assert_eq!(
        field_value(&registry, "VK_STRUCTURE_TYPE_BIND_BUFFER_MEMORY_INFO"),
        EnumValue::Literal(Literal::Int(1_000_157_000))
    );
    assert_eq!(
        field_value(&registry, "VK_ERROR_SURFACE_LOST_KHR"),
        EnumValue::Literal(Literal::Int(-1_000_000_000))
    );
    assert_eq!(
        field_value(&registry, "VK_STRUCTURE_TYPE_XLIB_SURFACE_CREATE_INFO_KHR"),
        EnumValue::Literal(Literal::Int(1_000_004_000))
    );
    assert_eq!(
        field_value(&registry, "VK_QUEUE_PROTECTED_BIT"),
        EnumValue::Bitpos(4)
    );
    assert_eq!(
        field_value(&registry, "VK_KHR_SURFACE_SPEC_VERSION"),
        EnumValue::Literal(Literal::Int(25))
    );

    let alias = registry
        .find_field("VK_STRUCTURE_TYPE_BIND_BUFFER_MEMORY_INFO_KHR")
        .unwrap();
    let target = registry.resolve_field_alias(alias).unwrap();
    assert_eq!(
        registry.field(target).unwrap().name,
        "VK_STRUCTURE_TYPE_BIND_BUFFER_MEMORY_INFO"
    );

    let structure_type = registry.enum_by_name("VkStructureType").unwrap();
    assert_eq!(structure_type.fields.len(), 5);
}

#[test]
fn extension_attributes_are_read() {
    let registry = load("vulkan");
    let surface = registry.extensions.by_name("VK_KHR_surface").unwrap();
    assert_eq!(surface.sortorder, Some(1));
    assert_eq!(surface.supported, ["vulkan", "vulkansc"]);
    let xlib = registry.extensions.by_name("VK_KHR_xlib_surface").unwrap();
    assert_eq!(xlib.sortorder, None);
}

#[test]
fn commands_are_classified_by_first_handle() {
    let registry = load("vulkan");
    let dispatch = |name: &str| classify(&registry, registry.commands.find(name).unwrap()).unwrap();
    assert_eq!(dispatch("vkCreateInstance"), Dispatch::Global);
    assert_eq!(dispatch("vkGetInstanceProcAddr"), Dispatch::Global);
    assert_eq!(dispatch("vkEnumeratePhysicalDevices"), Dispatch::Instance);
    assert_eq!(dispatch("vkCreateXlibSurfaceKHR"), Dispatch::Instance);
    assert_eq!(dispatch("vkCmdDispatch"), Dispatch::Device);
    assert_eq!(dispatch("vkCmdDispatchEXT"), Dispatch::Device);

    let command = registry.command_by_name("vkCmdDispatch").unwrap();
    assert_eq!(command.queues, CommandQueue::GRAPHICS | CommandQueue::COMPUTE);
}

#[test]
fn declarations_are_decorated() {
    let registry = load("vulkan");
    let syntax = Syntax::default();
    let decorated = |ty: &str, member: &str| {
        let m = registry
            .type_by_name(ty)
            .unwrap()
            .members
            .iter()
            .find(|m| m.name == member)
            .unwrap();
        decorate(&m.name, &m.ty.name, &m.declarator, &m.len, false, &syntax).unwrap()
    };

    assert_eq!(decorated("VkApplicationInfo", "pNext"), "rawptr");
    assert_eq!(decorated("VkApplicationInfo", "pApplicationName"), "cstring");
    assert_eq!(decorated("VkBaseOutStructure", "pNext"), "^BaseOutStructure");
    assert_eq!(decorated("VkInstanceCreateInfo", "pApplicationInfo"), "^ApplicationInfo");
    assert_eq!(decorated("VkInstanceCreateInfo", "ppEnabledLayerNames"), "[^]cstring");
    assert_eq!(
        decorated("VkPhysicalDeviceProperties", "deviceName"),
        "[MAX_PHYSICAL_DEVICE_NAME_SIZE]u8"
    );
    assert_eq!(decorated("VkPhysicalDeviceProperties", "pointSizeRange"), "[2]f32");
}

#[test]
fn emitted_bindings() {
    let registry = load("vulkan");
    let config = Config {
        package: String::from("vk"),
        platforms: vec![String::from("xlib")],
        ..Config::default()
    };
    let generator = Generator::new(&registry, &config).unwrap();

    let constants = generator.render(Category::Constants).unwrap();
    assert!(constants.starts_with("package vk\n"));
    let lines: Vec<_> = constants.lines().filter(|l| l.contains(" :: ")).collect();
    assert_eq!(
        lines,
        [
            "API_VERSION_1_0 :: 4194304",
            "MAX_PHYSICAL_DEVICE_NAME_SIZE :: 256",
            "WHOLE_SIZE :: ~u64(0)",
            "MAX_DEVICE_NAME_SIZE :: MAX_PHYSICAL_DEVICE_NAME_SIZE",
            "KHR_SURFACE_SPEC_VERSION :: 25",
        ]
    );

    let procedures = generator.render(Category::Procedures).unwrap();
    assert!(procedures.contains(
        "ProcCreateInstance :: #type proc \"system\" (pCreateInfo: ^InstanceCreateInfo, pInstance: ^Instance) -> Result"
    ));
    assert!(procedures.contains(
        "ProcEnumeratePhysicalDevices :: #type proc \"system\" (instance: Instance, pPhysicalDeviceCount: ^u32, pPhysicalDevices: [^]PhysicalDevice) -> Result"
    ));
    assert!(procedures.contains("ProcCmdDispatchEXT :: ProcCmdDispatchKHR"));

    let types = generator.render(Category::Types).unwrap();
    assert!(types.contains("QueueFlags :: distinct bit_set[QueueFlagBits; Flags]"));
    assert!(types.contains("DeviceSize :: distinct u64"));
    assert!(types.contains(
        "ProcAllocationFunction :: #type proc \"system\" (pUserData: rawptr, size: u32) -> rawptr"
    ));
    assert!(types.contains("XlibSurfaceCreateInfoKHR :: struct {"));
    assert!(types.contains("\tpInfo: ^ApplicationInfo,"));

    let enums = generator.render(Category::Enums).unwrap();
    assert!(enums.contains("\tXLIB_SURFACE_CREATE_INFO_KHR = 1000004000,"));
    assert!(enums.contains("\tBIND_BUFFER_MEMORY_INFO_KHR = BIND_BUFFER_MEMORY_INFO,"));
    assert!(enums.contains("\tPROTECTED = 4,"));

    let dir = std::env::temp_dir().join(format!("vk-bindgen-it-{}", std::process::id()));
    let written = generator.write_all(&dir).unwrap();
    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "constants.odin",
            "enums.odin",
            "types.odin",
            "procedures.odin",
            "loader.odin",
            "formats.odin"
        ]
    );
    assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), constants);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn output_is_deterministic() {
    let config = Config::default();
    let first = load("vulkan");
    let second = load("vulkan");
    let a = Generator::new(&first, &config).unwrap();
    let b = Generator::new(&second, &config).unwrap();
    for category in Category::ALL.iter() {
        assert_eq!(a.render(*category).unwrap(), b.render(*category).unwrap());
    }
}

#[test]
fn dangling_references_are_fatal() {
    let broken = REGISTRY.replace(
        r#"<type name="VkInstanceCreateInfo"/>"#,
        r#"<type name="VkInstanceCreateInfoMissing"/>"#,
    );
    match parse_stream(broken.as_bytes(), "vulkan") {
        Err(FatalError::UnresolvedReference { kind, name, .. }) => {
            assert_eq!(kind, EntityKind::Type);
            assert_eq!(name, "VkInstanceCreateInfoMissing");
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

const FORMATS: &str = r#"<registry>
    <types>
        <type name="VkFormat" category="enum"/>
    </types>
    <enums name="VkFormat" type="enum">
        <enum value="0" name="VK_FORMAT_UNDEFINED"/>
        <enum value="37" name="VK_FORMAT_R8G8B8A8_UNORM"/>
    </enums>
    <extensions>
        <extension name="VK_IMG_format_pvrtc" number="55" type="device" supported="vulkan">
            <require>
                <enum offset="0" extends="VkFormat" name="VK_FORMAT_PVRTC1_2BPP_UNORM_BLOCK_IMG"/>
            </require>
        </extension>
    </extensions>
    <formats>
        <format name="VK_FORMAT_R8G8B8A8_UNORM" class="32-bit" blockSize="4" texelsPerBlock="1" packed="8">
            <component name="R" bits="8" numericFormat="UNORM"/>
            <component name="G" bits="8" numericFormat="UNORM"/>
            <component name="B" bits="8" numericFormat="UNORM"/>
            <component name="A" bits="8" numericFormat="UNORM"/>
            <plane index="0" widthDivisor="1" heightDivisor="1" compatible="VK_FORMAT_PVRTC1_2BPP_UNORM_BLOCK_IMG"/>
        </format>
        <format name="VK_FORMAT_PVRTC1_2BPP_UNORM_BLOCK_IMG" class="PVRTC1_2BPP" blockSize="8" texelsPerBlock="1" blockExtent="8,4,1" compressed="PVRTC">
            <component name="R" bits="compressed" numericFormat="UNORM"/>
            <component name="G" bits="compressed" numericFormat="UNORM"/>
            <component name="B" bits="compressed" numericFormat="UNORM"/>
            <component name="A" bits="compressed" numericFormat="UNORM"/>
        </format>
    </formats>
</registry>"#;

#[test]
fn formats_of_other_apis_are_dropped() {
    let vulkan = parse_stream(FORMATS.as_bytes(), "vulkan").unwrap();
    assert_eq!(vulkan.formats.len(), 2);
    let rgba = vulkan.formats.by_name("VK_FORMAT_R8G8B8A8_UNORM").unwrap();
    assert_eq!(rgba.planes.len(), 1);
    assert!(rgba.planes[0].compatible.is_resolved());

    let sc = parse_stream(FORMATS.as_bytes(), "vulkansc").unwrap();
    assert_eq!(sc.formats.len(), 1);
    assert!(sc.formats.find("VK_FORMAT_PVRTC1_2BPP_UNORM_BLOCK_IMG").is_none());
    let rgba = sc.formats.by_name("VK_FORMAT_R8G8B8A8_UNORM").unwrap();
    assert!(rgba.planes.is_empty());
    assert!(rgba.field.is_resolved());
}

#[test]
fn formats_of_unknown_fields_are_fatal() {
    let broken = FORMATS.replace(
        r#"<format name="VK_FORMAT_PVRTC1_2BPP_UNORM_BLOCK_IMG""#,
        r#"<format name="VK_FORMAT_PVRTC1_4BPP_UNORM_BLOCK_IMG""#,
    );
    for api in ["vulkan", "vulkansc"].iter() {
        match parse_stream(broken.as_bytes(), api) {
            Err(FatalError::UnresolvedReference { kind, name, .. }) => {
                assert_eq!(kind, EntityKind::EnumField);
                assert_eq!(name, "VK_FORMAT_PVRTC1_4BPP_UNORM_BLOCK_IMG");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}

#[test]
fn features_patch_in_version_order() {
    let xml = r#"<registry>
        <types>
            <type name="VkStructureType" category="enum"/>
        </types>
        <enums name="VkStructureType" type="enum">
            <enum value="0" name="VK_STRUCTURE_TYPE_APPLICATION_INFO"/>
        </enums>
        <feature api="vulkan" name="VK_VERSION_1_2" number="1.2">
            <require>
                <enum extends="VkStructureType" extnumber="50" offset="5" name="VK_STRUCTURE_TYPE_SHARED"/>
                <enum extends="VkStructureType" extnumber="50" offset="6" name="VK_STRUCTURE_TYPE_LATER"/>
            </require>
        </feature>
        <feature api="vulkan" name="VK_VERSION_1_1" number="1.1">
            <require>
                <enum extends="VkStructureType" extnumber="50" offset="2" name="VK_STRUCTURE_TYPE_SHARED"/>
            </require>
        </feature>
    </registry>"#;
    let registry = parse_stream(xml.as_bytes(), "vulkan").unwrap();
    let v1_1 = registry.features.find("VK_VERSION_1_1").unwrap();
    let v1_2 = registry.features.find("VK_VERSION_1_2").unwrap();

    let shared = registry.field(registry.find_field("VK_STRUCTURE_TYPE_SHARED").unwrap()).unwrap();
    assert_eq!(shared.value, EnumValue::Literal(Literal::Int(1_000_049_002)));
    assert_eq!(shared.origin, Origin::Feature(v1_1));
    let later = registry.field(registry.find_field("VK_STRUCTURE_TYPE_LATER").unwrap()).unwrap();
    assert_eq!(later.origin, Origin::Feature(v1_2));

    let names: Vec<_> = registry
        .enum_by_name("VkStructureType")
        .unwrap()
        .fields
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        names,
        [
            "VK_STRUCTURE_TYPE_APPLICATION_INFO",
            "VK_STRUCTURE_TYPE_SHARED",
            "VK_STRUCTURE_TYPE_LATER"
        ]
    );
}

#[test]
fn missing_required_attribute_is_fatal() {
    let broken = REGISTRY.replace(
        r#"<extension name="VK_EXT_fault_reporting" number="299" supported="vulkansc">"#,
        r#"<extension name="VK_EXT_fault_reporting" number="299">"#,
    );
    match parse_stream(broken.as_bytes(), "vulkan") {
        Err(FatalError::MissingAttribute { name, xpath }) => {
            assert_eq!(name, "supported");
            assert!(xpath.contains("extension"), "{}", xpath);
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn enum_alias_cycle_is_fatal() {
    let broken = REGISTRY.replace(
        r#"<enum value="-3" name="VK_ERROR_INITIALIZATION_FAILED"/>"#,
        r#"<enum name="VK_ERROR_A" alias="VK_ERROR_B"/>
        <enum name="VK_ERROR_B" alias="VK_ERROR_A"/>"#,
    );
    match parse_stream(broken.as_bytes(), "vulkan") {
        Err(FatalError::AliasCycle { kind, .. }) => assert_eq!(kind, EntityKind::EnumField),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn command_alias_cycle_is_fatal() {
    let broken = REGISTRY.replace(
        r#"<command name="vkCmdDispatchKHR" alias="vkCmdDispatch"/>"#,
        r#"<command name="vkCmdDispatchKHR" alias="vkCmdDispatchEXT"/>"#,
    );
    match parse_stream(broken.as_bytes(), "vulkan") {
        Err(FatalError::AliasCycle { kind, name }) => {
            assert_eq!(kind, EntityKind::Command);
            assert!(name.starts_with("vkCmdDispatch"), "{}", name);
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}
