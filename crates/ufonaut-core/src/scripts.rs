//! Pre-request and test script attachment.
//!
//! Scripts are keyed by normalized endpoint name and live on disk as
//! `<dir>/pre-request/<name>.js` and `<dir>/test/<name>.js`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collection::{Collection, Endpoint, Event, Listen, RequestItem};
use crate::error::ConvertError;
use crate::normalize::normalized_endpoint_name;
use crate::placeholder::placeholder;
use crate::template::interpolate;

/// Sub-directory holding pre-request scripts.
pub const PRE_REQUEST_DIR: &str = "pre-request";
/// Sub-directory holding test scripts.
pub const TEST_DIR: &str = "test";
/// Extension of script files.
pub const SCRIPT_EXTENSION: &str = "js";

/// Variable the request body is moved to when a template is used.
const REQUEST_BODY_VARIABLE: &str = "requestBody";

/// Script bodies for one normalized endpoint name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptEntry {
    pub normalized_name: String,
    #[serde(default)]
    pub pre_request_script_content: String,
    #[serde(default)]
    pub test_script_content: String,
}

/// Attach the matching scripts to one request item.
///
/// Items without a URL path, and items no entry matches, are left alone.
/// When several entries share a name the first one wins. With a template and
/// a body, the body is replaced by `{{requestBody}}` and the original text is
/// interpolated into the pre-request script instead.
pub fn attach(item: &mut RequestItem, scripts: &[ScriptEntry], template: Option<&str>) {
    let Some(path) = item.request.url.path_key() else {
        return;
    };
    let normalized = normalized_endpoint_name(&item.request.method, Some(&path));

    let Some(entry) = scripts.iter().find(|s| s.normalized_name == normalized) else {
        return;
    };
    tracing::debug!(endpoint = %normalized, "attaching scripts");

    let mut pre_request = entry.pre_request_script_content.clone();
    if let (Some(template), Some(body)) = (template, item.request.body.as_mut()) {
        let original_body = body.raw.take().unwrap_or_default();
        body.raw = Some(placeholder(REQUEST_BODY_VARIABLE));
        pre_request = interpolate(template, &original_body, &pre_request);
    }

    if !pre_request.is_empty() {
        item.event
            .push(Event::javascript(Listen::Prerequest, &pre_request));
    }
    if !entry.test_script_content.is_empty() {
        item.event
            .push(Event::javascript(Listen::Test, &entry.test_script_content));
    }
}

/// Attach scripts to every request item of the collection.
///
/// # Errors
///
/// [`ConvertError::ScriptsEmpty`] when `scripts` is empty, even though
/// no item would have matched.
pub fn add_scripts(
    collection: &mut Collection,
    scripts: &[ScriptEntry],
    template: Option<&str>,
) -> Result<(), ConvertError> {
    if scripts.is_empty() {
        return Err(ConvertError::ScriptsEmpty);
    }
    collection.for_each_item_mut(|item| attach(item, scripts, template));
    Ok(())
}

fn script_file(dir: &Path, phase: &str, name: &str) -> std::path::PathBuf {
    dir.join(phase).join(format!("{name}.{SCRIPT_EXTENSION}"))
}

/// Read a script file, treating a missing file as empty.
fn read_optional(path: &Path) -> Result<String, ConvertError> {
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))
}

/// Build one entry per endpoint from the files under `dir`.
pub fn scripts_for_endpoints(
    dir: &Path,
    endpoints: &[Endpoint],
) -> Result<Vec<ScriptEntry>, ConvertError> {
    endpoints
        .iter()
        .map(|endpoint| {
            Ok(ScriptEntry {
                normalized_name: endpoint.normalized.clone(),
                pre_request_script_content: read_optional(&script_file(
                    dir,
                    PRE_REQUEST_DIR,
                    &endpoint.normalized,
                ))?,
                test_script_content: read_optional(&script_file(
                    dir,
                    TEST_DIR,
                    &endpoint.normalized,
                ))?,
            })
        })
        .collect()
}

/// File names directly under `dir`, sorted; a missing directory is empty.
fn list_files(dir: &Path) -> Result<Vec<String>, ConvertError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e))? {
        let entry = entry.map_err(|e| ConvertError::io(dir, e))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Load every script found under a scripts catalog.
///
/// Test file names come first, followed by pre-request-only names. The file
/// stem is the normalized endpoint name.
pub fn load_scripts_catalog(dir: &Path) -> Result<Vec<ScriptEntry>, ConvertError> {
    let test_files = list_files(&dir.join(TEST_DIR))?;
    let pre_request_files = list_files(&dir.join(PRE_REQUEST_DIR))?;

    let mut file_names = test_files.clone();
    file_names.extend(
        pre_request_files
            .into_iter()
            .filter(|name| !test_files.contains(name)),
    );

    file_names
        .iter()
        .map(|file_name| {
            let stem = Path::new(file_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.clone());
            Ok(ScriptEntry {
                normalized_name: stem,
                pre_request_script_content: read_optional(
                    &dir.join(PRE_REQUEST_DIR).join(file_name),
                )?,
                test_script_content: read_optional(&dir.join(TEST_DIR).join(file_name))?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::test_support::{collection_of, request_item};
    use crate::collection::Body;
    use tempfile::TempDir;

    fn entry(name: &str, pre: &str, test: &str) -> ScriptEntry {
        ScriptEntry {
            normalized_name: name.to_string(),
            pre_request_script_content: pre.to_string(),
            test_script_content: test.to_string(),
        }
    }

    #[test]
    fn test_prerequest_before_test() {
        let mut item = request_item("POST", Some(&["pet"]));
        attach(&mut item, &[entry("post-pet", "A", "B")], None);
        assert_eq!(item.event.len(), 2);
        assert_eq!(item.event[0].listen, Listen::Prerequest);
        assert_eq!(item.event[0].script.exec, vec!["A"]);
        assert_eq!(item.event[1].listen, Listen::Test);
        assert_eq!(item.event[1].script.exec, vec!["B"]);
    }

    #[test]
    fn test_empty_content_yields_no_event() {
        let mut item = request_item("POST", Some(&["pet"]));
        attach(&mut item, &[entry("post-pet", "", "B")], None);
        assert_eq!(item.event.len(), 1);
        assert_eq!(item.event[0].listen, Listen::Test);
    }

    #[test]
    fn test_no_match_leaves_item_unchanged() {
        let mut item = request_item("GET", Some(&["pet"]));
        let before = item.clone();
        attach(&mut item, &[entry("post-pet", "A", "B")], Some("tpl"));
        assert_eq!(item, before);
    }

    #[test]
    fn test_item_without_path_is_skipped() {
        let mut item = request_item("POST", None);
        attach(&mut item, &[entry("post-undefined", "A", "B")], None);
        assert!(item.event.is_empty());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut item = request_item("POST", Some(&["pet"]));
        attach(
            &mut item,
            &[entry("post-pet", "first", ""), entry("post-pet", "second", "")],
            None,
        );
        assert_eq!(item.event[0].script.exec, vec!["first"]);
    }

    #[test]
    fn test_template_moves_body_into_script() {
        let mut item = request_item("POST", Some(&["store", "order"]));
        item.request.body = Some(Body::raw_json("{\"id\": {{id}}}"));
        let scripts = [entry("post-storeorder", "const q = 1;", "")];

        attach(
            &mut item,
            &scripts,
            Some("var requestBody = <%%= requestBody =%%>;\n<%%= scriptContent =%%>"),
        );

        let body = item.request.body.as_ref().unwrap();
        assert_eq!(body.raw.as_deref(), Some("{{requestBody}}"));
        assert_eq!(item.event.len(), 1);
        assert_eq!(
            item.event[0].source(),
            "var requestBody = {\"id\": {{id}}};\nconst q = 1;"
        );
        // the shared entry is not rewritten
        assert_eq!(scripts[0].pre_request_script_content, "const q = 1;");
    }

    #[test]
    fn test_template_without_body_keeps_plain_script() {
        let mut item = request_item("GET", Some(&["pet"]));
        attach(&mut item, &[entry("get-pet", "plain", "")], Some("T <%%= scriptContent =%%>"));
        assert_eq!(item.event[0].source(), "plain");
    }

    #[test]
    fn test_add_scripts_rejects_empty() {
        let mut collection = collection_of(vec![request_item("GET", Some(&["pet"]))]);
        let err = add_scripts(&mut collection, &[], None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Scripts not provided or provided config contains no script entries"
        );
    }

    #[test]
    fn test_add_scripts_with_no_matches_is_ok() {
        let mut collection = collection_of(vec![request_item("GET", Some(&["pet"]))]);
        add_scripts(&mut collection, &[entry("post-user", "A", "")], None).unwrap();
        assert!(collection.request_items()[0].event.is_empty());
    }

    fn catalog() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PRE_REQUEST_DIR)).unwrap();
        fs::create_dir_all(dir.path().join(TEST_DIR)).unwrap();
        fs::write(dir.path().join("pre-request/get-pet.js"), "pre-pet").unwrap();
        fs::write(dir.path().join("pre-request/post-user.js"), "pre-user").unwrap();
        fs::write(dir.path().join("test/get-pet.js"), "test-pet").unwrap();
        fs::write(dir.path().join("test/delete-pet.js"), "test-delete").unwrap();
        dir
    }

    #[test]
    fn test_load_catalog_unions_directories() {
        let dir = catalog();
        let scripts = load_scripts_catalog(dir.path()).unwrap();
        let names: Vec<_> = scripts.iter().map(|s| s.normalized_name.as_str()).collect();
        assert_eq!(names, vec!["delete-pet", "get-pet", "post-user"]);
        assert_eq!(scripts[1].pre_request_script_content, "pre-pet");
        assert_eq!(scripts[1].test_script_content, "test-pet");
        assert_eq!(scripts[0].pre_request_script_content, "");
        assert_eq!(scripts[2].test_script_content, "");
    }

    #[test]
    fn test_missing_catalog_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_scripts_catalog(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_scripts_for_endpoints_reads_by_normalized_name() {
        let dir = catalog();
        let collection = collection_of(vec![
            request_item("GET", Some(&["pet"])),
            request_item("PUT", Some(&["pet"])),
        ]);
        let scripts = scripts_for_endpoints(dir.path(), &collection.list_endpoints()).unwrap();
        assert_eq!(scripts.len(), 2);
        assert_eq!(scripts[0], entry("get-pet", "pre-pet", "test-pet"));
        assert_eq!(scripts[1], entry("put-pet", "", ""));
    }
}
