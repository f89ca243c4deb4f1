//! File-manager tool set: sandboxed file operations.
//!
//! Every path argument is interpreted relative to a sandbox directory and
//! may not escape it: absolute paths, `..` components and shell
//! metacharacters are rejected before touching the filesystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::mcp::content::ReturnValue;
use crate::mcp::property::{Property, PropertyList, SchemaError};
use crate::mcp::server::{McpServer, MessageSink, ServerInfo};

/// Largest file the read tool will return.
const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Builds a complete file-manager server rooted at `sandbox`.
///
/// # Errors
///
/// Returns an error if a tool schema cannot be declared.
pub fn server(sink: MessageSink, sandbox: PathBuf) -> Result<McpServer, SchemaError> {
    let mut server = McpServer::new(ServerInfo::new("File Manager Server", "1.0.0"), sink);
    register(&mut server, sandbox)?;
    Ok(server)
}

/// Registers the file-manager tools on an existing server.
///
/// Creates the sandbox directory if it does not exist.
///
/// # Errors
///
/// Returns an error if a tool schema cannot be declared.
pub fn register(server: &mut McpServer, sandbox: PathBuf) -> Result<(), SchemaError> {
    if let Err(e) = fs::create_dir_all(&sandbox) {
        tracing::warn!(path = %sandbox.display(), error = %e, "Could not create sandbox directory");
    }

    let mut read_props = PropertyList::new();
    read_props.push(Property::string("path", None::<&str>)?)?;
    let read_sandbox = sandbox.clone();
    server.add_simple_tool(
        "read_file",
        "Read content from a file",
        read_props,
        move |props| read_file(&read_sandbox, props),
    );

    let mut write_props = PropertyList::new();
    write_props.push(Property::string("path", None::<&str>)?)?;
    write_props.push(Property::string("content", None::<&str>)?)?;
    let write_sandbox = sandbox.clone();
    server.add_simple_tool(
        "write_file",
        "Write content to a file",
        write_props,
        move |props| write_file(&write_sandbox, props),
    );

    let mut list_props = PropertyList::new();
    list_props.push(Property::string("path", Some("."))?)?;
    let list_sandbox = sandbox.clone();
    server.add_simple_tool(
        "list_directory",
        "List files in a directory",
        list_props,
        move |props| list_directory(&list_sandbox, props),
    );

    let mut delete_props = PropertyList::new();
    delete_props.push(Property::string("path", None::<&str>)?)?;
    let delete_sandbox = sandbox.clone();
    server.add_simple_tool(
        "delete_file",
        "Delete a file",
        delete_props,
        move |props| delete_file(&delete_sandbox, props),
    );

    let mut info_props = PropertyList::new();
    info_props.push(Property::string("path", None::<&str>)?)?;
    server.add_simple_tool(
        "file_info",
        "Get file information",
        info_props,
        move |props| file_info(&sandbox, props),
    );

    Ok(())
}

/// Rejects paths that could escape the sandbox or smuggle shell syntax.
fn is_safe_path(path: &str) -> bool {
    if path.is_empty() || Path::new(path).is_absolute() {
        return false;
    }
    if path.contains("..") {
        return false;
    }
    !path.contains([';', '|', '&'])
}

/// Resolves a relative path inside the sandbox.
fn resolve(sandbox: &Path, relative: &str) -> Option<PathBuf> {
    is_safe_path(relative).then(|| sandbox.join(relative))
}

fn error(text: impl Into<String>) -> ReturnValue {
    ReturnValue::Text(text.into())
}

fn read_file(sandbox: &Path, props: &PropertyList) -> ReturnValue {
    let Some(path) = props.string_value("path") else {
        return error("Error: Path must be a string");
    };
    let Some(full_path) = resolve(sandbox, path) else {
        return error("Error: Invalid or unsafe path");
    };

    match fs::metadata(&full_path) {
        Ok(meta) if meta.len() > MAX_FILE_SIZE => {
            return error("Error: File too large (max 1MB)");
        }
        Ok(_) => {}
        Err(e) => return error(format!("Error: Cannot open file '{path}': {e}")),
    }

    match fs::read_to_string(&full_path) {
        Ok(content) => ReturnValue::Text(format!(
            "File content ({} bytes):\n{content}",
            content.len()
        )),
        Err(e) => error(format!("Error: Cannot open file '{path}': {e}")),
    }
}

fn write_file(sandbox: &Path, props: &PropertyList) -> ReturnValue {
    let (Some(path), Some(content)) = (props.string_value("path"), props.string_value("content"))
    else {
        return error("Error: Path and content must be strings");
    };
    let Some(full_path) = resolve(sandbox, path) else {
        return error("Error: Invalid or unsafe path");
    };

    match fs::write(&full_path, content) {
        Ok(()) => ReturnValue::Text(format!(
            "Successfully wrote {} bytes to '{path}'",
            content.len()
        )),
        Err(e) => error(format!("Error: Cannot create file '{path}': {e}")),
    }
}

fn list_directory(sandbox: &Path, props: &PropertyList) -> ReturnValue {
    let Some(path) = props.string_value("path") else {
        return error("Error: Path must be a string");
    };
    let Some(full_path) = resolve(sandbox, path) else {
        return error("Error: Invalid or unsafe path");
    };

    let entries = match fs::read_dir(&full_path) {
        Ok(entries) => entries,
        Err(e) => return error(format!("Error: Cannot open directory '{path}': {e}")),
    };

    // Sorted for stable output; readdir order is filesystem-dependent
    let mut lines = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        match entry.metadata() {
            Ok(meta) if meta.is_dir() => lines.push(format!("  [DIR]  {name}/")),
            Ok(meta) => lines.push(format!("  [FILE] {name} ({} bytes)", meta.len())),
            Err(_) => {}
        }
    }
    lines.sort();

    let mut listing = String::from("Directory listing:\n");
    for line in &lines {
        listing.push_str(line);
        listing.push('\n');
    }

    ReturnValue::Text(listing)
}

fn delete_file(sandbox: &Path, props: &PropertyList) -> ReturnValue {
    let Some(path) = props.string_value("path") else {
        return error("Error: Path must be a string");
    };
    let Some(full_path) = resolve(sandbox, path) else {
        return error("Error: Invalid or unsafe path");
    };

    match fs::remove_file(&full_path) {
        Ok(()) => ReturnValue::Text(format!("Successfully deleted file '{path}'")),
        Err(e) => error(format!("Error: Cannot delete file '{path}': {e}")),
    }
}

fn file_info(sandbox: &Path, props: &PropertyList) -> ReturnValue {
    let Some(path) = props.string_value("path") else {
        return error("Error: Path must be a string");
    };
    let Some(full_path) = resolve(sandbox, path) else {
        return error("Error: Invalid or unsafe path");
    };

    let meta = match fs::metadata(&full_path) {
        Ok(meta) => meta,
        Err(e) => return error(format!("Error: Cannot get info for '{path}': {e}")),
    };

    let modified = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or_else(|| "unknown".to_string(), |d| d.as_secs().to_string());

    ReturnValue::Text(format!(
        "File information for '{path}':\n\
         \x20 Type: {}\n\
         \x20 Size: {} bytes\n\
         \x20 Read-only: {}\n\
         \x20 Last modified: {modified}",
        if meta.is_dir() {
            "Directory"
        } else {
            "Regular file"
        },
        meta.len(),
        meta.permissions().readonly(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bound(path_value: &str) -> PropertyList {
        let mut schema = PropertyList::new();
        schema
            .push(Property::string("path", None::<&str>).unwrap())
            .unwrap();
        schema
            .bind(json!({ "path": path_value }).as_object(), false)
            .unwrap()
    }

    #[test]
    fn safe_path_rules() {
        assert!(is_safe_path("notes.txt"));
        assert!(is_safe_path("sub/dir/notes.txt"));
        assert!(!is_safe_path("/etc/passwd"));
        assert!(!is_safe_path("../escape.txt"));
        assert!(!is_safe_path("a;b"));
        assert!(!is_safe_path("a|b"));
        assert!(!is_safe_path("a&b"));
        assert!(!is_safe_path(""));
    }

    #[test]
    fn read_rejects_unsafe_path() {
        let sandbox = tempfile::tempdir().unwrap();
        let ReturnValue::Text(text) = read_file(sandbox.path(), &bound("../outside.txt")) else {
            panic!("Expected Text");
        };
        assert_eq!(text, "Error: Invalid or unsafe path");
    }

    #[test]
    fn write_then_read_round_trip() {
        let sandbox = tempfile::tempdir().unwrap();

        let mut schema = PropertyList::new();
        schema
            .push(Property::string("path", None::<&str>).unwrap())
            .unwrap();
        schema
            .push(Property::string("content", None::<&str>).unwrap())
            .unwrap();
        let write_args = schema
            .bind(
                json!({"path": "hello.txt", "content": "hello world"}).as_object(),
                false,
            )
            .unwrap();

        let ReturnValue::Text(text) = write_file(sandbox.path(), &write_args) else {
            panic!("Expected Text");
        };
        assert_eq!(text, "Successfully wrote 11 bytes to 'hello.txt'");

        let ReturnValue::Text(text) = read_file(sandbox.path(), &bound("hello.txt")) else {
            panic!("Expected Text");
        };
        assert!(text.starts_with("File content (11 bytes):"));
        assert!(text.ends_with("hello world"));
    }

    #[test]
    fn read_missing_file_is_error() {
        let sandbox = tempfile::tempdir().unwrap();
        let ReturnValue::Text(text) = read_file(sandbox.path(), &bound("missing.txt")) else {
            panic!("Expected Text");
        };
        assert!(text.starts_with("Error: Cannot open file 'missing.txt'"));
    }

    #[test]
    fn list_directory_reports_entries() {
        let sandbox = tempfile::tempdir().unwrap();
        fs::write(sandbox.path().join("a.txt"), "aaa").unwrap();
        fs::create_dir(sandbox.path().join("docs")).unwrap();

        let ReturnValue::Text(text) = list_directory(sandbox.path(), &bound(".")) else {
            panic!("Expected Text");
        };
        assert!(text.starts_with("Directory listing:"));
        assert!(text.contains("[FILE] a.txt (3 bytes)"));
        assert!(text.contains("[DIR]  docs/"));
    }

    #[test]
    fn delete_removes_file() {
        let sandbox = tempfile::tempdir().unwrap();
        let target = sandbox.path().join("doomed.txt");
        fs::write(&target, "x").unwrap();

        let ReturnValue::Text(text) = delete_file(sandbox.path(), &bound("doomed.txt")) else {
            panic!("Expected Text");
        };
        assert_eq!(text, "Successfully deleted file 'doomed.txt'");
        assert!(!target.exists());
    }

    #[test]
    fn file_info_reports_type_and_size() {
        let sandbox = tempfile::tempdir().unwrap();
        fs::write(sandbox.path().join("info.txt"), "12345").unwrap();

        let ReturnValue::Text(text) = file_info(sandbox.path(), &bound("info.txt")) else {
            panic!("Expected Text");
        };
        assert!(text.contains("Type: Regular file"));
        assert!(text.contains("Size: 5 bytes"));
    }

    #[test]
    fn registers_all_tools_in_order() {
        let sandbox = tempfile::tempdir().unwrap();
        let mut server = McpServer::new(
            ServerInfo::new("File Manager Server", "1.0.0"),
            Box::new(|_| {}),
        );
        register(&mut server, sandbox.path().to_path_buf()).unwrap();

        let names: Vec<&str> = server.registry().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            [
                "read_file",
                "write_file",
                "list_directory",
                "delete_file",
                "file_info"
            ]
        );
    }
}
