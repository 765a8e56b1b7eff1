//! Common test helper functions shared across test modules.
//!
//! This module provides a throwaway copy of the container GUI project and
//! release fixtures, reducing duplication across the integrator, tester
//! and monitor suites.
use chrono::{TimeZone, Utc};
use std::{
    fs,
    path::PathBuf,
    sync::Arc,
};
use tempfile::TempDir;

use crate::{
    analyzer::ReleaseAnalyzer,
    config::Config,
    process::CommandOutput,
    report::{Report, ReportBuilder},
    upstream::types::Release,
};

pub const UTILS_JS: &str = r#"import { invoke } from '@tauri-apps/api/core';

export const containerUtils = {
  async executeCommand(args, options = {}) {
    return await invoke('execute_container_command', { args, ...options });
  },

  async runContainer(image, options = {}) {
    return await this.executeCommand(['run', image], options);
  },

  async buildImage(context, options = {}) {
    return await this.executeCommand(['build', context], options);
  },

  async getContainerLogs(id, options = {}) {
    return await this.executeCommand(['logs', id], options);
  },
};
"#;

pub const RUN_FORM_JSX: &str = r#"import React, { useState } from 'react';

export default function RunContainer() {
  const [formData, setFormData] = useState({});

  const runContainer = (e) => {
    e.preventDefault();
  };

  return (
    <form onSubmit={runContainer} className="space-y-4">
      <input
        type="text"
        value={formData.image || ''}
        onChange={(e) => setFormData({ ...formData, image: e.target.value })}
      />
      <button type="submit" className="btn-primary">
        Run Container
      </button>
    </form>
  );
}
"#;

pub const BUILD_FORM_JSX: &str = r#"import React, { useState } from 'react';

export default function BuildImage() {
  const [buildFormData, setBuildFormData] = useState({});

  const buildImage = () => {};

  return (
    <div className="space-y-4">
      <input
        type="text"
        value={buildFormData.context || ''}
        onChange={(e) => setBuildFormData({ ...buildFormData, context: e.target.value })}
      />
      <button onClick={buildImage} className="btn-primary">
        Build Image
      </button>
    </div>
  );
}
"#;

pub const IMAGES_JSX: &str = r#"import React from 'react';

export default function Images() {
  return <div className="p-6">Images</div>;
}
"#;

pub const LOGS_JSX: &str = r#"import React from 'react';

export default function Logs() {
  return <div className="p-6">Logs</div>;
}
"#;

pub const SIDEBAR_JSX: &str = r#"import React from 'react';
import { Link } from 'react-router-dom';

export default function Sidebar() {
  return (
    <aside className="w-64">
      <nav className="p-4 space-y-2">
        <Link to="/">Dashboard</Link>
        <Link to="/images">Images</Link>
      </nav>
    </aside>
  );
}
"#;

pub const ROUTES_INDEX_JS: &str = r#"import Dashboard from './Dashboard';
import RunContainer from './RunContainer';

export {
  Dashboard,
  RunContainer
};
"#;

pub const PACKAGE_JSON: &str = r#"{
  "name": "container-gui",
  "version": "0.4.1",
  "description": "Modern GUI for Apple Container CLI",
  "dependencies": {
    "react": "^18.2.0",
    "@tauri-apps/api": "^2.0.0"
  },
  "devDependencies": {},
  "scripts": {
    "start": "react-scripts start",
    "build": "react-scripts build",
    "test": "react-scripts test",
    "tauri": "tauri"
  }
}
"#;

pub const TAURI_CONF_JSON: &str = r#"{
  "productName": "Container GUI",
  "version": "0.4.1",
  "identifier": "com.example.container-gui",
  "bundle": {
    "active": true,
    "longDescription": "Desktop application for Apple's container CLI"
  }
}
"#;

/// A minimal container GUI project in a temporary directory, with a
/// [`Config`] rooted at it.
pub struct GuiFixture {
    pub dir: TempDir,
    pub config: Config,
}

impl GuiFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config {
            project_root: dir.path().to_path_buf(),
            ..Config::default()
        };

        let fixture = Self { dir, config };
        let paths = fixture.config.paths.clone();

        fixture.write(&paths.utils_module, UTILS_JS);
        fixture.write(&paths.run_form, RUN_FORM_JSX);
        fixture.write(&paths.build_form, BUILD_FORM_JSX);
        fixture.write(&paths.images_page, IMAGES_JSX);
        fixture.write(&paths.logs_page, LOGS_JSX);
        fixture.write(&paths.sidebar, SIDEBAR_JSX);
        fixture.write(&paths.routes_index, ROUTES_INDEX_JS);
        fixture.write(&paths.package_manifest, PACKAGE_JSON);
        fixture.write(&paths.bundle_config, TAURI_CONF_JSON);

        fixture
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn shared_config(&self) -> Arc<Config> {
        Arc::new(self.config.clone())
    }
}

/// Creates a published release with the given tag and body.
pub fn create_test_release(id: u64, tag: &str, body: &str) -> Release {
    Release {
        id,
        tag_name: tag.into(),
        name: Some(tag.into()),
        published_at: Some(Utc.with_ymd_and_hms(2025, 6, 9, 18, 0, 0).unwrap()),
        body: Some(body.into()),
        prerelease: false,
        draft: false,
        html_url: format!("https://github.com/apple/container/releases/tag/{tag}"),
    }
}

/// The `container volume` release used by end-to-end scenarios.
pub fn volume_release() -> Release {
    create_test_release(
        42,
        "v0.3.0",
        "`container volume` is now supported with `--driver` flag (✨ new feature)",
    )
}

/// Analyze a release with the default rules and build its report.
pub fn create_test_report(release: &Release) -> Report {
    let analysis = ReleaseAnalyzer::new().analyze(release);
    ReportBuilder::generate_release_report(release, &analysis)
}

pub fn exit_ok() -> CommandOutput {
    CommandOutput {
        success: true,
        code: Some(0),
        ..CommandOutput::default()
    }
}

pub fn exit_failed(stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        code: Some(1),
        stderr: stderr.into(),
        ..CommandOutput::default()
    }
}
