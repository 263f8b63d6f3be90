use guarded_fetch::FetchResponse;

pub mod check;
pub mod get;
pub mod post;

/// Write a response to stdout, optionally preceded by its head
pub fn print_response(response: &FetchResponse, include: bool) {
    if include {
        println!("{} {}", response.status(), response.final_url());
        for (name, value) in response.headers() {
            println!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
        }
        println!();
    }

    print!("{}", response.text_lossy());

    if response.is_truncated() {
        tracing::warn!(
            "Body from {} truncated at {} bytes",
            response.final_url(),
            response.body().len()
        );
    }
}

/// Accept types as the fetcher expects them; none means no `Accept` header
pub fn accept_types(accept: &[String]) -> Option<Vec<String>> {
    (!accept.is_empty()).then(|| accept.to_vec())
}
