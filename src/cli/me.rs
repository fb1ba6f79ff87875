use crate::{Result, cli::Session, info};

pub async fn me() -> Result<()> {
    let session = Session::load().await?;
    let user = session.api().profile().current_user().await?;

    info!(
        "{} ({})",
        user.display_name.as_deref().unwrap_or(&user.id),
        user.uri
    );
    if let Some(email) = &user.email {
        info!("Email: {}", email);
    }
    if let Some(country) = &user.country {
        info!("Country: {}", country);
    }
    if let Some(product) = &user.product {
        info!("Subscription: {}", product);
    }
    if let Some(followers) = &user.followers {
        info!("Followers: {}", followers.total);
    }

    session.finish().await
}
