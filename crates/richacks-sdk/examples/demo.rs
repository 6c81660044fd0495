//! 本地回退演示
//!
//! 不配置远程凭证时，所有读写都落在本地 KV 存储上。
//! 运行：`RUST_LOG=richacks_sdk=debug cargo run --example demo`

use richacks_sdk::{
    AdNetwork, CommunityMessage, MessageType, MonetizationConfig, Post, RichacksConfig,
    RichacksSDK,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("\n==============================================");
    println!("📦 Richacks SDK 本地回退演示");
    println!("==============================================\n");

    let data_dir = std::env::temp_dir().join("richacks_demo");
    let config = RichacksConfig::builder().data_dir(&data_dir).build();
    let sdk = RichacksSDK::initialize(config).await?;

    // 变更通知：UI 收到后重新读取
    sdk.events()
        .add_listener(|event| {
            println!("   🔔 数据变更: {}", event.key());
        })
        .await;

    println!("📋 分类");
    let category = sdk.add_category("Xbox Series X").await;
    for c in sdk.list_categories().await {
        println!("   {} | {} | {}", c.id, c.name, c.slug);
    }

    println!("\n📋 帖子");
    sdk.save_post(Post {
        id: "demo-post".to_string(),
        title: "Pack de texturas HD".to_string(),
        video_url: Some("https://youtu.be/demo".to_string()),
        description: "Texturas para la serie X".to_string(),
        download_url: None,
        category: category.id.clone(),
        main_image: None,
        mini_image: None,
        date: "2024-01-17".to_string(),
        created_at: None,
    })
    .await;
    for p in sdk.list_posts().await {
        println!("   {} | {} | createdAt={:?}", p.id, p.title, p.created_at);
    }

    println!("\n📋 社区消息");
    sdk.save_message(CommunityMessage {
        id: "demo-msg".to_string(),
        user: "ana".to_string(),
        message_type: MessageType::Request,
        message: "¿Tutorial de shaders?".to_string(),
        audio_url: None,
        image_url: None,
        date: "hoy".to_string(),
        timestamp: 0,
    })
    .await;
    println!("   共 {} 条", sdk.list_messages().await.len());

    println!("\n📋 配置");
    sdk.save_config(
        42,
        MonetizationConfig {
            active_network: AdNetwork::Ezoic,
            ezoic_id: Some("12345".to_string()),
            ..MonetizationConfig::default()
        },
    )
    .await;
    let dashboard = sdk.get_config().await;
    println!(
        "   subs={} network={:?}",
        dashboard.subs, dashboard.monetization.active_network
    );

    sdk.delete_post("demo-post").await;
    sdk.delete_category(&category.id).await;
    sdk.delete_message("demo-msg").await;

    let stats = sdk.events().get_stats().await;
    println!("\n✅ 演示完成，共 {} 次本地变更", stats.total_events);

    Ok(())
}
