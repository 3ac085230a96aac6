//! OpenAPI fragment for the catalog routes.
//!
//! Paths are relative to the module mount; the HTTP layer prefixes them.

use serde_json::{json, Map, Value};

/// `(singular segment, list segment, tag)` for each catalog entity.
const ENTITIES: [(&str, &str, &str); 4] = [
    ("author", "authors", "Authors"),
    ("genre", "genres", "Genres"),
    ("book", "books", "Books"),
    ("bookinstance", "bookinstances", "Book copies"),
];

fn render_response() -> Value {
    json!({
        "description": "Render instruction",
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/RenderInstruction" }
            }
        }
    })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn redirect_response() -> Value {
    json!({
        "description": "Redirect to the resulting page",
        "headers": { "Location": { "schema": { "type": "string" } } }
    })
}

fn operation(summary: String, tag: &str, with_id: bool, with_body: bool) -> Value {
    let mut responses = Map::new();
    responses.insert("200".to_string(), render_response());
    if with_body || summary.starts_with("Delete") {
        responses.insert("303".to_string(), redirect_response());
    }
    if with_id {
        responses.insert("404".to_string(), error_response("Not found"));
    }
    responses.insert("500".to_string(), error_response("Store failure"));

    let mut op = json!({
        "summary": summary,
        "tags": [tag],
        "responses": responses,
    });
    if with_id {
        op["parameters"] = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        }]);
    }
    if with_body {
        op["requestBody"] = json!({
            "content": {
                "application/x-www-form-urlencoded": { "schema": { "type": "object" } },
                "application/json": { "schema": { "type": "object" } }
            }
        });
    }
    op
}

pub fn document() -> Value {
    let mut paths = Map::new();
    let home = operation(
        "Catalog home with collection counts".to_string(),
        "Catalog",
        false,
        false,
    );
    paths.insert("/".to_string(), json!({ "get": home }));

    for (segment, list_segment, tag) in ENTITIES {
        paths.insert(
            format!("/{list_segment}"),
            json!({ "get": operation(format!("List {list_segment}"), tag, false, false) }),
        );
        paths.insert(
            format!("/{segment}/create"),
            json!({
                "get": operation(format!("Form to create a {segment}"), tag, false, false),
                "post": operation(format!("Create a {segment}"), tag, false, true),
            }),
        );
        paths.insert(
            format!("/{segment}/{{id}}"),
            json!({ "get": operation(format!("Show a {segment}"), tag, true, false) }),
        );
        paths.insert(
            format!("/{segment}/{{id}}/delete"),
            json!({
                "get": operation(format!("Delete confirmation for a {segment}"), tag, true, false),
                "post": operation(
                    format!("Delete a {segment} unless referenced"),
                    tag,
                    true,
                    false,
                ),
            }),
        );
        paths.insert(
            format!("/{segment}/{{id}}/update"),
            json!({
                "get": operation(format!("Form to update a {segment}"), tag, true, false),
                "post": operation(format!("Update a {segment}"), tag, true, true),
            }),
        );
    }

    json!({
        "paths": paths,
        "components": {
            "schemas": {
                "RenderInstruction": {
                    "type": "object",
                    "properties": {
                        "view": { "type": "string" },
                        "context": { "type": "object" }
                    },
                    "required": ["view", "context"]
                }
            }
        }
    })
}
