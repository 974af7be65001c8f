use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Purposes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Purposes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Purposes::OrgId).string().not_null())
                    .col(ColumnDef::new(Purposes::Name).string().not_null())
                    .col(ColumnDef::new(Purposes::Description).string())
                    .col(ColumnDef::new(Purposes::PurposeType).string().not_null())
                    .col(
                        ColumnDef::new(Purposes::Attributes)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Purposes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purposes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Purpose names are unique per org; this is what lets the catalog
        // reject a create with a name already in use by another purpose.
        manager
            .create_index(
                Index::create()
                    .name("idx_purposes_org_name")
                    .table(Purposes::Table)
                    .col(Purposes::OrgId)
                    .col(Purposes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Consents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Consents::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Consents::OrgId).string().not_null())
                    .col(ColumnDef::new(Consents::ClientId).string().not_null())
                    .col(ColumnDef::new(Consents::SubjectId).string().not_null())
                    .col(ColumnDef::new(Consents::ConsentType).string().not_null())
                    .col(
                        ColumnDef::new(Consents::ValidityTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Consents::Revoked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Consents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Consents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_consents_org_created_at")
                    .table(Consents::Table)
                    .col(Consents::OrgId)
                    .col(Consents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_consents_org_subject")
                    .table(Consents::Table)
                    .col(Consents::OrgId)
                    .col(Consents::SubjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConsentPurposeLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsentPurposeLinks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConsentPurposeLinks::OrgId).string().not_null())
                    .col(ColumnDef::new(ConsentPurposeLinks::ConsentId).uuid().not_null())
                    .col(ColumnDef::new(ConsentPurposeLinks::PurposeId).uuid().not_null())
                    .col(
                        ColumnDef::new(ConsentPurposeLinks::Mandatory)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ConsentPurposeLinks::Approved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ConsentPurposeLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsentPurposeLinks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purpose_links_consent")
                            .from(ConsentPurposeLinks::Table, ConsentPurposeLinks::ConsentId)
                            .to(Consents::Table, Consents::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purpose_links_purpose")
                            .from(ConsentPurposeLinks::Table, ConsentPurposeLinks::PurposeId)
                            .to(Purposes::Table, Purposes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_purpose_links_consent")
                    .table(ConsentPurposeLinks::Table)
                    .col(ConsentPurposeLinks::ConsentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Authorizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Authorizations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Authorizations::OrgId).string().not_null())
                    .col(ColumnDef::new(Authorizations::ConsentId).uuid().not_null())
                    .col(
                        ColumnDef::new(Authorizations::PurposeLinkId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Authorizations::UserId).string().not_null())
                    .col(ColumnDef::new(Authorizations::AuthType).string().not_null())
                    .col(ColumnDef::new(Authorizations::Status).string().not_null())
                    .col(
                        ColumnDef::new(Authorizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Authorizations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_authorizations_consent")
                            .from(Authorizations::Table, Authorizations::ConsentId)
                            .to(Consents::Table, Consents::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_authorizations_consent")
                    .table(Authorizations::Table)
                    .col(Authorizations::ConsentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_authorizations_user")
                    .table(Authorizations::Table)
                    .col(Authorizations::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Authorizations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConsentPurposeLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Consents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Purposes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Purposes {
    Table,
    Id,
    OrgId,
    Name,
    Description,
    PurposeType,
    Attributes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Consents {
    Table,
    Id,
    OrgId,
    ClientId,
    SubjectId,
    ConsentType,
    ValidityTime,
    Revoked,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ConsentPurposeLinks {
    Table,
    Id,
    OrgId,
    ConsentId,
    PurposeId,
    Mandatory,
    Approved,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Authorizations {
    Table,
    Id,
    OrgId,
    ConsentId,
    PurposeLinkId,
    UserId,
    AuthType,
    Status,
    CreatedAt,
    UpdatedAt,
}
