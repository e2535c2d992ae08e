use crate::types::AnalysisRequest;

/// Render the analysis prompt for one chunk.
///
/// The instructions pin the response to a bare JSON array so the parser has
/// a fighting chance; everything else is context for the model. Variable
/// path segments are requested in curly braces so observations of the same
/// parameterized route spell it identically.
pub fn build_prompt(request: &AnalysisRequest) -> String {
    let note = if request.is_partial {
        "This is a partial chunk of a larger file."
    } else {
        "This is a complete file or section."
    };
    format!(
        "\nYou are an expert API endpoint analyzer. Your task is to extract ALL HTTP API endpoints (methods and paths) from the provided code.\n\
         \n\
         File: {file_path}\n\
         Language: {language}\n\
         {note}\n\
         \n\
         CODE:\n\
         ```\n\
         {content}\n\
         ```\n\
         \n\
         Please extract ALL API endpoints with their HTTP methods and paths. For each endpoint found, provide:\n\
         1. The HTTP method (GET, POST, PUT, DELETE, PATCH, etc.)\n\
         2. The path (e.g., \"/api/users\", \"/v1/products/{{id}}\")\n\
         \n\
         Only include actual endpoints, not helper functions or middleware. If endpoints include variables, represent them as path parameters in curly braces like \"/users/{{id}}\" or \"/products/{{productId}}\".\n\
         \n\
         Format your response as a JSON array with \"method\" and \"path\" properties for each endpoint. Example:\n\
         [\n\
         \x20\x20{{\"method\": \"GET\", \"path\": \"/api/users\"}},\n\
         \x20\x20{{\"method\": \"POST\", \"path\": \"/api/users\"}},\n\
         \x20\x20{{\"method\": \"GET\", \"path\": \"/api/users/{{id}}\"}}\n\
         ]\n\
         \n\
         If you don't find any endpoints, return an empty array: []\n",
        file_path = request.file_path,
        language = request.language,
        content = request.content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiscout_chunker::Language;

    fn request(is_partial: bool) -> AnalysisRequest {
        AnalysisRequest {
            content: "router.get('/users', list);".to_string(),
            language: Language::JavaScript,
            file_path: "routes/users.js".to_string(),
            is_partial,
        }
    }

    #[test]
    fn prompt_carries_file_language_and_fenced_code() {
        let prompt = build_prompt(&request(false));
        assert!(prompt.contains("File: routes/users.js"));
        assert!(prompt.contains("Language: js"));
        assert!(prompt.contains("CODE:\n```\nrouter.get('/users', list);\n```\n"));
    }

    #[test]
    fn prompt_instructs_against_middleware_and_for_path_parameters() {
        let prompt = build_prompt(&request(false));
        assert!(prompt.contains("Only include actual endpoints, not helper functions or middleware."));
        assert!(prompt.contains("path parameters in curly braces like \"/users/{id}\" or \"/products/{productId}\""));
        assert!(prompt.contains("return an empty array: []"));
    }

    #[test]
    fn one_of_the_two_scope_notes_is_always_present() {
        let partial = build_prompt(&request(true));
        assert!(partial.contains("This is a partial chunk of a larger file."));
        assert!(!partial.contains("This is a complete file or section."));

        let whole = build_prompt(&request(false));
        assert!(whole.contains("This is a complete file or section."));
        assert!(!whole.contains("This is a partial chunk of a larger file."));
    }

    #[test]
    fn example_array_in_the_prompt_is_valid_json() {
        let prompt = build_prompt(&request(false));
        let start = prompt.find("Example:\n").unwrap() + "Example:\n".len();
        let end = prompt.find("\n\nIf you don't find").unwrap();
        let example = &prompt[start..end];
        let parsed: serde_json::Value = serde_json::from_str(example).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(3));
    }
}
