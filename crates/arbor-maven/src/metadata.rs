//! `maven-metadata.xml` parsing for version discovery.

use arbor_util::errors::{ArborError, ArborResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Artifact-level Maven metadata listing available versions.
#[derive(Debug, Clone, Default)]
pub struct MavenMetadata {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub latest: Option<String>,
    pub release: Option<String>,
    pub versions: Vec<String>,
}

/// Parse an artifact-level `maven-metadata.xml` that lists available versions.
pub fn parse_metadata(xml: &str) -> ArborResult<MavenMetadata> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut meta = MavenMetadata::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    let fail = |e: &dyn std::fmt::Display| ArborError::Pom {
        message: format!("Failed to parse maven-metadata.xml: {e}"),
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
                text.clear();
            }
            Ok(Event::Text(ref e)) => {
                text = e.unescape().map_err(|err| fail(&err))?.to_string();
            }
            Ok(Event::End(_)) => {
                match path.join(">").as_str() {
                    "metadata>groupId" => meta.group_id = Some(text.clone()),
                    "metadata>artifactId" => meta.artifact_id = Some(text.clone()),
                    "metadata>versioning>latest" => meta.latest = Some(text.clone()),
                    "metadata>versioning>release" => meta.release = Some(text.clone()),
                    "metadata>versioning>versions>version" => meta.versions.push(text.clone()),
                    _ => {}
                }
                path.pop();
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(fail(&e)),
            _ => {}
        }
    }

    Ok(meta)
}
