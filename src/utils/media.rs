use actix_web::HttpRequest;
use std::env;
use std::path::PathBuf;

/// Racine de stockage des fichiers uploadés (MEDIA_ROOT, défaut: ./media)
pub fn media_root() -> PathBuf {
    PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()))
}

/// Chemin relatif d'une photo de parcelle:
/// plot_images/<owner_id>/<plot_id>/<filename>
pub fn plot_media_path(owner_id: i32, plot_id: i32, filename: &str) -> String {
    format!("plot_images/{}/{}/{}", owner_id, plot_id, filename)
}

/// Nettoie un nom de fichier client avant stockage sur disque
pub fn sanitize_filename(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Construit l'URL absolue d'un fichier média à partir de la requête
/// (équivalent de build_absolute_uri côté client HTTP)
pub fn absolute_media_url(req: &HttpRequest, relative: &str) -> String {
    let conn = req.connection_info();
    format!("{}://{}/media/{}", conn.scheme(), conn.host(), relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_media_path_layout() {
        assert_eq!(
            plot_media_path(7, 42, "tomato.jpg"),
            "plot_images/7/42/tomato.jpg"
        );
    }

    #[test]
    fn test_sanitize_filename_replaces_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "______etc_passwd");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
    }

    #[test]
    fn test_sanitize_filename_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("///"), "upload");
    }
}
