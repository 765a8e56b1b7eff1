//! Tera templates for everything the integrator generates.
use serde::Serialize;

use crate::error::Result;

/// Render a one-off template without autoescaping.
pub fn render<T: Serialize>(template: &str, data: &T) -> Result<String> {
    let context = tera::Context::from_serialize(data)?;
    Ok(tera::Tera::one_off(template, &context, false)?)
}

pub const UTILS_METHOD: &str = r#"
  // Auto-generated support for container {{ command }}
  async {{ method }}(options = {}) {
    const args = [{{ args }}];

    // Add common flags
    if (options.format) args.push('--format', options.format);
    if (options.all) args.push('--all');
    if (options.verbose) args.push('--verbose');

    return await this.executeCommand(args, options);
  },
"#;

pub const FLAG_VALIDATION: &str = r#"
  // Auto-generated flag validation for {{ tag }}
  validateFlags(command, flags) {
    const supportedFlags = {
{%- for flag in flags %}
      '{{ flag }}': true{% if not loop.last %},{% endif %}
{%- endfor %}
    };

    return flags.filter(flag => supportedFlags[flag] || flag.startsWith('--'));
  },
"#;

pub const FORM_FIELD: &str = r#"
          {/* Auto-generated for {{ flag }} - {{ tag }} */}
          <div className="space-y-2">
            <label className="text-sm font-medium text-gray-700">
              {{ label }}
            </label>
            <input
              type="text"
              value={{ "{" }}{{ state }}.{{ field }} || ''}
              onChange={(e) => {{ setter }}({ ...{{ state }}, {{ field }}: e.target.value })}
              className="w-full px-3 py-2 border border-gray-300 rounded-md focus:ring-2 focus:ring-blue-500"
              placeholder="Enter {{ name }} value"
            />
          </div>"#;

pub const NAV_ENTRY: &str = r#"        <Link
          to="{{ route }}"
          className="flex items-center space-x-3 px-4 py-2 rounded-lg hover:bg-gray-100 transition-colors"
        >
          <span className="text-gray-600">🔧</span>
          <span>{{ page }}</span>
          <span className="ml-auto text-xs bg-green-100 text-green-800 px-2 py-1 rounded">New</span>
        </Link>"#;

pub const PAGE: &str = r#"import React, { useState } from 'react';
import { invoke } from '@tauri-apps/api/core';
import CommandOutput from '../components/CommandOutput';

// Auto-generated page for 'container {{ command }}' command
// Generated from {{ tag }} release

export default function {{ page }}() {
  const [loading, setLoading] = useState(false);
  const [output, setOutput] = useState('');
  const [error, setError] = useState('');
  const [formData] = useState({});

  const {{ method }} = async () => {
    setLoading(true);
    setError('');
    setOutput('');

    try {
      const result = await invoke('execute_container_command', {
        args: [{{ args }}, ...Object.entries(formData)
          .filter(([, value]) => value)
          .flatMap(([key, value]) => [`--${key.replace(/([A-Z])/g, '-$1').toLowerCase()}`, value])]
      });

      setOutput(result);
    } catch (err) {
      setError(err.toString());
    } finally {
      setLoading(false);
    }
  };

  return (
    <div className="p-6 max-w-6xl mx-auto">
      <div className="mb-6">
        <h1 className="text-3xl font-bold text-gray-900">Container {{ page }}</h1>
        <p className="text-gray-600 mt-2">
          Execute 'container {{ command }}' command with advanced options
        </p>
        <div className="mt-2 px-3 py-1 bg-blue-100 text-blue-800 text-sm rounded-md inline-block">
          New in {{ tag }}
        </div>
      </div>

      <div className="grid grid-cols-1 lg:grid-cols-2 gap-6">
        <div className="space-y-4">
          <div className="bg-white rounded-lg shadow-md p-6">
            <h2 className="text-xl font-semibold mb-4">Command Options</h2>
            <div className="space-y-4">
              <button
                onClick={{ "{" }}{{ method }}}
                disabled={loading}
                className="w-full bg-blue-600 text-white py-2 px-4 rounded-md hover:bg-blue-700 disabled:opacity-50 transition-colors"
              >
                {loading ? 'Executing...' : 'Execute container {{ command }}'}
              </button>
            </div>
          </div>
        </div>

        <div className="space-y-4">
          <CommandOutput
            output={output}
            error={error}
            loading={loading}
            title="container {{ command }} output"
          />
        </div>
      </div>
    </div>
  );
}
"#;

pub const RELEASE_NOTES: &str = r#"# Container GUI Release Notes

## Latest Update: Support for Apple Container {{ tag }}

**Release Date:** {{ date }}
**Container CLI Version:** {{ tag }}
**Release URL:** {{ url }}

### 🎉 New Features Added

{% if features -%}
{% for feature in features -%}
- {{ feature }}
{% endfor -%}
{% else -%}
- Updated compatibility with latest Apple Container CLI
{% endif %}
### 🔧 New Commands Supported

{% if commands -%}
{% for command in commands -%}
- `container {{ command }}`
{% endfor -%}
{% else -%}
- No new commands in this release
{% endif %}
### 🚩 New Flags & Options

{% if flags -%}
{% for flag in flags -%}
- `{{ flag }}`
{% endfor -%}
{% else -%}
- No new flags in this release
{% endif %}
### ⚠️ Breaking Changes

{% if breaking_changes -%}
{% for change in breaking_changes -%}
- {{ change }}
{% endfor -%}
{% else -%}
- No breaking changes in this release
{% endif %}
### 🐛 Bug Fixes

{% if bug_fixes -%}
{% for fix in bug_fixes -%}
- {{ fix }}
{% endfor -%}
{% else -%}
- General stability improvements
{% endif %}
### 🔄 Integration Details

**Automatic Updates:**
- CLI command mappings updated
- UI forms enhanced with new options

**Manual Testing Required:**
- Test new commands in the GUI
- Verify flag behavior matches CLI

---

*This release was automatically generated from Apple Container {{ tag }} release analysis.*
*Generated on: {{ generated_at }}*
"#;
