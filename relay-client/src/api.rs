//! Typed Relay operations over [`RequestClient`].

use std::sync::Arc;

use serde_json::Value;
use shared::{
    models::{Comment, NewPost, Post, ProfileUpdate, UserSearchEntry, UserSummary},
    validation,
};
use tracing::debug;

use crate::{
    body::ResponseBody,
    error::ApiResult,
    request::{ApiRequest, RequestClient},
    session::SessionManager,
};

/// Followers and following of one user, fetched together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connections {
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
}

/// The Relay endpoints as typed calls.
///
/// Every call goes out through the shared [`RequestClient`], so it carries
/// the session cookie. A call the server answers with 401 evicts the local
/// session before the error is handed back.
#[derive(Clone, Debug)]
pub struct RelayApi {
    client: RequestClient,
    session: Arc<SessionManager>,
}

impl RelayApi {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            client: session.client().clone(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    async fn call(&self, request: ApiRequest) -> ApiResult<ResponseBody> {
        let result = self.client.send(request).await;
        if let Err(err) = &result
            && err.is_authentication_failure()
        {
            self.session.evict();
        }
        result
    }

    // Users

    /// `GET /users/search?q=`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn search_users(&self, query: &str) -> ApiResult<Vec<UserSearchEntry>> {
        let request = ApiRequest::get("users/search").with_query("q", query.trim());
        list(self.call(request).await?)
    }

    /// `GET /users/{username}`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn user(&self, username: &str) -> ApiResult<UserSummary> {
        self.call(ApiRequest::get(user_path(username, "")))
            .await?
            .into_model()
    }

    /// `GET /users/me`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn me(&self) -> ApiResult<UserSummary> {
        self.call(ApiRequest::get("users/me")).await?.into_model()
    }

    /// Validates and submits profile edits (`PUT /users/me`).
    ///
    /// A server that answers without a body gets the edits applied to the
    /// signed-in user locally.
    ///
    /// # Errors
    /// Returns a `RequestFailed` [`crate::ApiError`] for a form rule
    /// violation without contacting the server, otherwise the classified
    /// server failure.
    pub async fn update_me(&self, update: &ProfileUpdate) -> ApiResult<UserSummary> {
        validation::profile_update(update)?;

        let request = ApiRequest::put("users/me").with_json(update)?;
        match self.call(request).await?.into_optional_model()? {
            Some(profile) => Ok(profile),
            None => match self.session.current_user() {
                Some(user) => Ok(user.with_update(update)),
                None => self.me().await,
            },
        }
    }

    /// `GET /users/{username}/follow`.
    ///
    /// Accepts a bare boolean, a `"true"`/`"false"` text body, or an object
    /// with a `following`/`isFollowing` flag.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn follow_status(&self, username: &str) -> ApiResult<bool> {
        let body = self
            .call(ApiRequest::get(user_path(username, "/follow")))
            .await?;
        Ok(follow_flag(&body))
    }

    /// Whether the current user follows `username`, read from the search
    /// results the way the profile view does.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn is_following(&self, username: &str) -> ApiResult<bool> {
        let entries = self.search_users(username).await?;
        Ok(entries
            .iter()
            .any(|entry| entry.username == username && entry.is_following))
    }

    /// `POST /users/{username}/follow`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn follow(&self, username: &str) -> ApiResult<()> {
        self.call(ApiRequest::post(user_path(username, "/follow")))
            .await
            .map(drop)
    }

    /// `DELETE /users/{username}/follow`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn unfollow(&self, username: &str) -> ApiResult<()> {
        self.call(ApiRequest::delete(user_path(username, "/follow")))
            .await
            .map(drop)
    }

    /// Follows or unfollows depending on the current state and returns the
    /// new state.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`]; the state is unchanged.
    pub async fn toggle_follow(&self, username: &str, currently_following: bool) -> ApiResult<bool> {
        if currently_following {
            self.unfollow(username).await?;
        } else {
            self.follow(username).await?;
        }
        Ok(!currently_following)
    }

    /// `GET /users/{username}/followers`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn followers(&self, username: &str) -> ApiResult<Vec<UserSummary>> {
        list(
            self.call(ApiRequest::get(user_path(username, "/followers")))
                .await?,
        )
    }

    /// `GET /users/{username}/following`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn following(&self, username: &str) -> ApiResult<Vec<UserSummary>> {
        list(
            self.call(ApiRequest::get(user_path(username, "/following")))
                .await?,
        )
    }

    /// Fetches followers and following concurrently; fails if either does.
    ///
    /// # Errors
    /// Returns the first classified [`crate::ApiError`].
    pub async fn connections(&self, username: &str) -> ApiResult<Connections> {
        let (followers, following) =
            tokio::try_join!(self.followers(username), self.following(username))?;
        Ok(Connections {
            followers,
            following,
        })
    }

    // Posts

    /// `GET /posts/timeline`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn timeline(&self) -> ApiResult<Vec<Post>> {
        list(self.call(ApiRequest::get("posts/timeline")).await?)
    }

    /// `GET /posts/user/{username}`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn user_posts(&self, username: &str) -> ApiResult<Vec<Post>> {
        let path = format!("posts/user/{}", segment(username));
        list(self.call(ApiRequest::get(path)).await?)
    }

    /// Trims, validates and publishes a post (`POST /posts`).
    ///
    /// # Errors
    /// Returns a `RequestFailed` [`crate::ApiError`] for blank or oversized
    /// content, otherwise the classified server failure.
    pub async fn publish_post(&self, content: &str) -> ApiResult<Post> {
        let content = validation::post_content(content)?;
        let request = ApiRequest::post("posts").with_json(&NewPost { content })?;
        self.call(request).await?.into_model()
    }

    /// `DELETE /posts/{id}`. A post that is already gone counts as deleted.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`] for anything but not-found.
    pub async fn delete_post(&self, id: i64) -> ApiResult<()> {
        match self.call(ApiRequest::delete(format!("posts/{id}"))).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => {
                debug!(post_id = id, "post already deleted");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// `POST /posts/{id}/like`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn like_post(&self, id: i64) -> ApiResult<()> {
        self.call(ApiRequest::post(format!("posts/{id}/like")))
            .await
            .map(drop)
    }

    /// `DELETE /posts/{id}/like`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn unlike_post(&self, id: i64) -> ApiResult<()> {
        self.call(ApiRequest::delete(format!("posts/{id}/like")))
            .await
            .map(drop)
    }

    /// Likes or unlikes `post` and updates its count and flag on success.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`]; `post` is left unchanged.
    pub async fn toggle_like(&self, post: &mut Post) -> ApiResult<()> {
        let liked = post.is_liked_by_current_user;
        if liked {
            self.unlike_post(post.id).await?;
        } else {
            self.like_post(post.id).await?;
        }
        post.apply_like(!liked);
        Ok(())
    }

    // Comments

    /// `GET /posts/{id}/comments`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`]; a missing post is
    /// `NotFound`.
    pub async fn comments(&self, post_id: i64) -> ApiResult<Vec<Comment>> {
        list(
            self.call(ApiRequest::get(format!("posts/{post_id}/comments")))
                .await?,
        )
    }

    /// Trims, validates and posts a comment as a raw `text/plain` body.
    ///
    /// # Errors
    /// Returns a `RequestFailed` [`crate::ApiError`] for blank or oversized
    /// text, otherwise the classified server failure.
    pub async fn add_comment(&self, post_id: i64, text: &str) -> ApiResult<Comment> {
        let content = validation::comment_content(text)?;
        let request = ApiRequest::post(format!("posts/{post_id}/comments")).with_text(content);
        self.call(request).await?.into_model()
    }

    /// `DELETE /posts/comments/{id}`.
    ///
    /// # Errors
    /// Returns the classified [`crate::ApiError`].
    pub async fn delete_comment(&self, id: i64) -> ApiResult<()> {
        self.call(ApiRequest::delete(format!("posts/comments/{id}")))
            .await
            .map(drop)
    }
}

/// An empty body is an empty list.
fn list<T: serde::de::DeserializeOwned>(body: ResponseBody) -> ApiResult<Vec<T>> {
    Ok(body.into_optional_model()?.unwrap_or_default())
}

fn user_path(username: &str, suffix: &str) -> String {
    format!("users/{}{suffix}", segment(username))
}

/// Percent-encodes one path segment.
fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn follow_flag(body: &ResponseBody) -> bool {
    match body {
        ResponseBody::Json(Value::Bool(flag)) => *flag,
        ResponseBody::Json(Value::Object(fields)) => ["following", "isFollowing"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_bool))
            .unwrap_or(false),
        ResponseBody::Text(text) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}
