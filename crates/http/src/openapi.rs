//! OpenAPI document assembled from module fragments

use serde_json::{json, Value};

use bookshelf_kernel::ModuleRegistry;

/// Path a module's routes are mounted under
pub fn module_path(api_prefix: &str, module_name: &str) -> String {
    format!("{}/{}", api_prefix.trim_end_matches('/'), module_name)
}

/// Merge every module's OpenAPI fragment into a single document
///
/// Module paths are prefixed with the module mount path; a fragment path of
/// `/` maps to the mount path itself.
pub fn merged_spec(registry: &ModuleRegistry, api_prefix: &str) -> Value {
    let mut openapi_spec = json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Bookshelf API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "In-memory book collection service"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["FailResponse"] = json!({
        "type": "object",
        "properties": {
            "status": {
                "type": "string",
                "enum": ["fail"]
            },
            "message": {
                "type": "string"
            }
        },
        "required": ["status", "message"]
    });

    openapi_spec["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": {
                                "type": "string"
                            }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };
        let mount = module_path(api_prefix, module.name());

        if let Some(paths) = module_spec.get("paths").and_then(Value::as_object) {
            for (path, path_item) in paths {
                let prefixed_path = if path == "/" {
                    mount.clone()
                } else {
                    format!("{}{}", mount, path)
                };
                openapi_spec["paths"][prefixed_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(Value::as_object)
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}
