//! SeaORM implementation of MemberDirectory

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::{DomainResult, Member, MemberDirectory, MemberRole};
use crate::infrastructure::database::entities::member;

pub struct SeaOrmMemberDirectory {
    db: DatabaseConnection,
}

impl SeaOrmMemberDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert or refresh a member record. E-mails are stored lower-cased.
    pub async fn upsert(&self, m: &Member) -> DomainResult<()> {
        let model = member::ActiveModel {
            id: Set(m.id.clone()),
            email: Set(m.email.to_lowercase()),
            display_name: Set(m.display_name.clone()),
            role: Set(role_to_db(m.role)),
            created_at: Set(Utc::now()),
        };
        member::Entity::insert(model)
            .on_conflict(
                OnConflict::column(member::Column::Id)
                    .update_columns([
                        member::Column::Email,
                        member::Column::DisplayName,
                        member::Column::Role,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn role_to_db(role: MemberRole) -> member::MemberRole {
    match role {
        MemberRole::Admin => member::MemberRole::Admin,
        MemberRole::Member => member::MemberRole::Member,
    }
}

fn model_to_domain(m: member::Model) -> Member {
    Member {
        id: m.id,
        email: m.email,
        display_name: m.display_name,
        role: match m.role {
            member::MemberRole::Admin => MemberRole::Admin,
            member::MemberRole::Member => MemberRole::Member,
        },
    }
}

#[async_trait]
impl MemberDirectory for SeaOrmMemberDirectory {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Member>> {
        let model = member::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(member::Column::Email))).eq(email.to_lowercase()))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Member>> {
        let model = member::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }
}
