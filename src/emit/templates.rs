//! Built-in templates, one per output file. Each can be replaced through the
//! `templates` table of the configuration.

pub const HEADER: &str = "\
package {{ package }}
// Generated from the Vulkan registry by vk-bindgen. Do not edit.
";

pub const CONSTANTS: &str = r#"{% include "header" %}
{% for c in constants -%}
{{ c.name }} :: {{ c.value }}{% if c.comment %} // {{ c.comment }}{% endif %}
{% endfor %}"#;

pub const ENUMS: &str = r#"{% include "header" %}
{% for e in enums %}
{{ e.name }} :: enum {{ e.backing }} {
{%- for f in e.fields %}
	{{ f.name }} = {{ f.value }},
{%- endfor %}
}
{% endfor %}
{% for c in flag_constants -%}
{{ c.name }} :: {{ c.value }}
{% endfor %}"#;

pub const TYPES: &str = r#"{% include "header" %}
Handle :: distinct rawptr
NonDispatchableHandle :: distinct u64

{% for b in basetypes -%}
{% if b.target %}{{ b.name }} :: distinct {{ b.target }}{% else %}{{ b.name }} :: struct {}{% endif %}
{% endfor %}
{% for h in handles -%}
{{ h.name }} :: distinct {% if h.dispatchable %}Handle{% else %}NonDispatchableHandle{% endif %}
{% endfor %}
{% for b in bitmasks -%}
{% if b.flag %}{{ b.name }} :: distinct bit_set[{{ b.flag }}; {{ b.backing }}]{% else %}{{ b.name }} :: distinct {{ b.backing }}{% endif %}
{% endfor %}
{% for f in funcpointers -%}
{{ f.name }} :: #type proc "system" ({% for p in f.params %}{{ p.name }}: {{ p.ty }}{% if not loop.last %}, {% endif %}{% endfor %}){% if f.ret %} -> {{ f.ret }}{% endif %}
{% endfor %}
{% for s in structs %}
{% if s.comment %}// {{ s.comment }}
{% endif %}{{ s.name }} :: struct {% if s.is_union %}#raw_union {% endif %}{
{%- for m in s.members %}
	{{ m.name }}: {{ m.ty }},{% if m.comment %} // {{ m.comment }}{% endif %}
{%- endfor %}
}
{% endfor %}
{% for a in aliases -%}
{{ a.name }} :: {{ a.target }}
{% endfor %}"#;

pub const PROCEDURES: &str = r#"{% include "header" %}
{% for p in procedures -%}
{% if p.alias %}{{ p.name }} :: {{ p.alias }}{% else %}{{ p.name }} :: #type proc "system" ({% for a in p.params %}{{ a.name }}: {{ a.ty }}{% if not loop.last %}, {% endif %}{% endfor %}){% if p.ret %} -> {{ p.ret }}{% endif %}{% endif %}
{% endfor %}"#;

pub const LOADER: &str = r#"{% include "header" %}
{% for t in tables %}
{{ t.name }}_Procs :: struct {
{%- for e in t.entries %}
	{{ e.field }}: {{ e.proc_type }},
{%- endfor %}
}
{% endfor %}
{% for t in tables %}
{%- if t.dispatch == "global" %}
load_global_procs :: proc(procs: ^Global_Procs, get_instance_proc_addr: ProcGetInstanceProcAddr) {
{%- for e in t.entries %}
	procs.{{ e.field }} = auto_cast get_instance_proc_addr(nil, "{{ e.symbol }}")
{%- endfor %}
}
{%- elif t.dispatch == "instance" %}
load_instance_procs :: proc(procs: ^Instance_Procs, instance: Instance, get_instance_proc_addr: ProcGetInstanceProcAddr) {
{%- for e in t.entries %}
	procs.{{ e.field }} = auto_cast get_instance_proc_addr(instance, "{{ e.symbol }}")
{%- endfor %}
}
{%- else %}
load_device_procs :: proc(procs: ^Device_Procs, device: Device, get_device_proc_addr: ProcGetDeviceProcAddr) {
{%- for e in t.entries %}
	procs.{{ e.field }} = auto_cast get_device_proc_addr(device, "{{ e.symbol }}")
{%- endfor %}
}
{%- endif %}
{% endfor %}"#;

pub const FORMATS: &str = r#"{% include "header" %}
Format_Info :: struct {
	class:            string,
	block_size:       u8,
	texels_per_block: u8,
	block_extent:     [3]u32,
	packed:           u8,
	compressed:       string,
	chroma:           string,
	component_count:  u8,
	plane_count:      u8,
}

format_info :: proc "contextless" (format: Format) -> (info: Format_Info, ok: bool) {
	#partial switch format {
{%- for f in formats %}
	case .{{ f.name }}:
		return {"{{ f.class }}", {{ f.block_size }}, {{ f.texels_per_block }}, { {{ f.block_extent }} }, {{ f.packed }}, "{{ f.compressed }}", "{{ f.chroma }}", {{ f.component_count }}, {{ f.plane_count }} }, true
{%- endfor %}
	}
	return
}
"#;
