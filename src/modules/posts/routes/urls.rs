use quill_kernel::API_PREFIX;

use crate::modules::posts::models::PostId;

/// Named post endpoints, for building canonical paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ListPosts,
    GetPost(PostId),
    DeletePost(PostId),
    EditPost(PostId),
}

/// Canonical path of an endpoint, including the API prefix.
pub fn url_for(endpoint: Endpoint) -> String {
    match endpoint {
        Endpoint::ListPosts => format!("{}/posts", API_PREFIX),
        Endpoint::GetPost(id) => format!("{}/posts/{}", API_PREFIX, id),
        Endpoint::DeletePost(id) => format!("{}/posts/{}/delete", API_PREFIX, id),
        Endpoint::EditPost(id) => format!("{}/post/{}/edit", API_PREFIX, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_every_endpoint() {
        assert_eq!(url_for(Endpoint::ListPosts), "/api/posts");
        assert_eq!(url_for(Endpoint::GetPost(1)), "/api/posts/1");
        assert_eq!(url_for(Endpoint::DeletePost(12)), "/api/posts/12/delete");
        assert_eq!(url_for(Endpoint::EditPost(3)), "/api/post/3/edit");
    }
}
