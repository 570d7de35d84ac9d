//! The gateway's route table.
//!
//! Several services share the public `/films` namespace: casting links live
//! in the actor service, ratings and critiques in the review service, and
//! everything else in the film service. The `/films` rule therefore picks
//! its upstream from the shape of the whole path, and the numeric-id
//! patterns must be tested before the film-service default.

use crate::routing::matcher::{AnyMatcher, ShapeMatcher};
use crate::routing::router::{Branch, LocalEndpoint, Rewrite, RouteRule, Router, Target};
use crate::upstream::Upstream;

/// Build the ordered route table.
pub fn gateway_router() -> Router {
    Router::new(vec![
        RouteRule::new("health", "/health", Target::Local(LocalEndpoint::Health))
            .with_matcher(ShapeMatcher::new().literal("health")),
        RouteRule::new("auth", "/auth", Target::Upstream(Upstream::Auth)),
        RouteRule::new("utilisateurs", "/utilisateurs", Target::Upstream(Upstream::User)),
        RouteRule::new("me", "/me", Target::Upstream(Upstream::User)),
        RouteRule::new("acteurs", "/acteurs", Target::Upstream(Upstream::Actor)),
        RouteRule::new("films", "/films", films_target()),
        RouteRule::new("bot", "/bot", Target::Upstream(Upstream::Bot))
            .with_rewrite(Rewrite::StripPrefix),
    ])
}

fn films_target() -> Target {
    Target::ByShape {
        branches: vec![
            // /films/:filmId/acteurs[/:acteurId]
            Branch {
                name: "films.casting",
                matcher: Box::new(AnyMatcher::new(vec![
                    Box::new(ShapeMatcher::new().literal("films").numeric().literal("acteurs")),
                    Box::new(
                        ShapeMatcher::new()
                            .literal("films")
                            .numeric()
                            .literal("acteurs")
                            .numeric(),
                    ),
                ])),
                upstream: Upstream::Actor,
            },
            // /films/:filmId/ratings, /films/:filmId/critiques
            Branch {
                name: "films.reviews",
                matcher: Box::new(
                    ShapeMatcher::new()
                        .literal("films")
                        .numeric()
                        .one_of(&["ratings", "critiques"]),
                ),
                upstream: Upstream::Review,
            },
            // /films/critiques[/...] admin collection
            Branch {
                name: "films.critiques",
                matcher: Box::new(ShapeMatcher::new().literal("films").literal("critiques").rest()),
                upstream: Upstream::Review,
            },
        ],
        default: Upstream::Film,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::router::{Forward, RouteDecision, RouteError};

    fn forward(path: &str) -> Forward {
        match gateway_router().resolve(path) {
            Ok(RouteDecision::Forward(f)) => f,
            other => panic!("expected a forward for {}, got {:?}", path, other),
        }
    }

    fn assert_routes(path: &str, upstream: Upstream, forwarded: &str) {
        let f = forward(path);
        assert_eq!(f.upstream, upstream, "upstream for {}", path);
        assert_eq!(f.path_and_query, forwarded, "forwarded path for {}", path);
    }

    #[test]
    fn test_casting_goes_to_actor_service_unchanged() {
        for film in [0u64, 1, 5, 42, 987_654_321] {
            for path in [
                format!("/films/{}/acteurs", film),
                format!("/films/{}/acteurs/", film),
                format!("/films/{}/acteurs/9", film),
                format!("/films/{}/acteurs/12345/", film),
            ] {
                assert_routes(&path, Upstream::Actor, &path);
            }
        }
    }

    #[test]
    fn test_film_reviews_go_to_review_service() {
        for film in [1u64, 7, 300] {
            for sub in ["ratings", "critiques", "ratings/", "critiques/"] {
                let path = format!("/films/{}/{}", film, sub);
                assert_routes(&path, Upstream::Review, &path);
            }
        }
    }

    #[test]
    fn test_admin_critiques_go_to_review_service() {
        assert_routes("/films/critiques", Upstream::Review, "/films/critiques");
        assert_routes("/films/critiques/", Upstream::Review, "/films/critiques/");
        assert_routes("/films/critiques/42", Upstream::Review, "/films/critiques/42");
        assert_routes("/films/critiques/abc", Upstream::Review, "/films/critiques/abc");
        assert_eq!(forward("/films/critiques/3").route, "films.critiques");
    }

    #[test]
    fn test_plain_films_go_to_film_service() {
        assert_routes("/films", Upstream::Film, "/films");
        assert_routes("/films/", Upstream::Film, "/films/");
        assert_routes("/films/7", Upstream::Film, "/films/7");
        assert_routes("/films/7?details=true", Upstream::Film, "/films/7?details=true");
    }

    #[test]
    fn test_non_numeric_film_id_falls_through_to_film_service() {
        assert_routes("/films/abc/acteurs", Upstream::Film, "/films/abc/acteurs");
        assert_routes("/films/abc/ratings", Upstream::Film, "/films/abc/ratings");
        assert_routes("/films/1/acteurs/abc", Upstream::Film, "/films/1/acteurs/abc");
        assert_routes("/films/1/acteurs/2/3", Upstream::Film, "/films/1/acteurs/2/3");
        assert_routes("/films/1/ratings/5", Upstream::Film, "/films/1/ratings/5");
    }

    #[test]
    fn test_casting_query_string_does_not_break_classification() {
        assert_routes("/films/1/acteurs?role=lead", Upstream::Actor, "/films/1/acteurs?role=lead");
    }

    #[test]
    fn test_trailing_slash_gives_identical_decision() {
        let a = forward("/films/1/acteurs/");
        let b = forward("/films/1/acteurs");
        assert_eq!((a.route, a.upstream), (b.route, b.upstream));
    }

    #[test]
    fn test_simple_prefix_rules() {
        assert_routes("/auth/login", Upstream::Auth, "/auth/login");
        assert_routes("/auth", Upstream::Auth, "/auth");
        assert_routes("/utilisateurs/3", Upstream::User, "/utilisateurs/3");
        assert_routes("/me", Upstream::User, "/me");
        assert_routes("/me/ratings", Upstream::User, "/me/ratings");
        assert_routes("/acteurs/4/films", Upstream::Actor, "/acteurs/4/films");
    }

    #[test]
    fn test_bot_prefix_is_stripped() {
        assert_routes("/bot/chat", Upstream::Bot, "/chat");
        assert_routes("/bot", Upstream::Bot, "/");
        assert_routes("/bot/", Upstream::Bot, "/");
    }

    #[test]
    fn test_segment_boundaries() {
        let router = gateway_router();
        for path in ["/filmsx", "/authx/login", "/mee", "/botchat", "/unknown", "/"] {
            assert_eq!(router.resolve(path), Err(RouteError::NotFound), "{}", path);
        }
    }

    #[test]
    fn test_health_is_local() {
        let router = gateway_router();
        assert_eq!(router.resolve("/health"), Ok(RouteDecision::Local(LocalEndpoint::Health)));
        assert_eq!(router.resolve("/health/"), Ok(RouteDecision::Local(LocalEndpoint::Health)));
    }

    #[test]
    fn test_traversal_is_rejected_before_routing() {
        let router = gateway_router();
        assert!(matches!(
            router.resolve("/films/1/../../auth"),
            Err(RouteError::MalformedPath(_))
        ));
        assert!(matches!(
            router.resolve("/films//acteurs"),
            Err(RouteError::MalformedPath(_))
        ));
    }
}
