use sea_query::Iden;

#[derive(Iden, Clone, Copy)]
pub enum User {
    Table,
    Id,
    Name,
    Email,
    Password,
    Events,
    CreatedAt,
    UpdatedAt,
}

/// Event documents. `liked_by`, `participants` are JSON arrays of user ids.
#[derive(Iden, Clone, Copy)]
pub enum Event {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    OrganizedBy,
    EventDate,
    EventTime,
    Location,
    Category,
    TicketPrice,
    Quantity,
    Image,
    Likes,
    LikedBy,
    Participants,
    BookingCount,
    Income,
    Revision,
    CreatedAt,
    UpdatedAt,
}
